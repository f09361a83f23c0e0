use std::process::ExitCode;

use anyhow::Context;
use prism_analysis::model::{Feature, FeatureQuery};
use prism_config::PrismConfig;

use crate::cli::{FeaturesArgs, OutputFormat};
use crate::error::CliError;

/// List the features visible from one document.
pub async fn execute(config: &PrismConfig, args: &FeaturesArgs) -> anyhow::Result<ExitCode> {
    let analyzer = super::analyzer(config)?;
    let analysis = analyzer.analyze(&[args.url.as_str()]).await;
    let document = analysis
        .get_document(&args.url)
        .map_err(|warning| CliError::NotAnalyzed {
            url: args.url.clone(),
            reason: warning.message,
        })?;

    let mut query = FeatureQuery::all()
        .imported(!args.local)
        .external_packages(config.external_packages);
    query.kind = args.kind;
    let features = document.get_features(&query);

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&features)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&features).context("Failed to serialize features")?;
            println!("{json}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render_text(features: &[Feature]) -> String {
    let mut out = String::new();
    for feature in features {
        // The most specific kind, e.g. `polymer-element` over `element`.
        let kind = feature
            .kinds()
            .last()
            .map(|kind| kind.as_str())
            .unwrap_or_default();
        let location = feature
            .source_range()
            .map(|range| range.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<30} {:<32} {}\n",
            kind,
            feature.name().unwrap_or("<anonymous>"),
            console::style(location).dim()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use prism_analysis::model::FeatureKind;
    use prism_analysis::{Analyzer, InMemoryUrlLoader};

    use super::*;

    #[tokio::test]
    async fn lists_the_most_specific_kind() {
        let loader = InMemoryUrlLoader::with_files([("x.html", "<script>Polymer({is: 'x-a'});</script>")]);
        let analysis = Analyzer::new().loader(Arc::new(loader)).analyze(&["x.html"]).await;
        let document = analysis.get_document("x.html").unwrap();
        let features = document.get_features(&FeatureQuery::kind(FeatureKind::Element));

        console::set_colors_enabled(false);
        let text = render_text(&features);
        assert!(text.starts_with("polymer-element"), "{text}");
        assert!(text.contains("x-a"));
        assert!(text.contains("x.html:1:"));
    }
}
