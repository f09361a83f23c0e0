//! Cross-document feature resolution.

mod common;

use common::*;
use prism_analysis::model::{FeatureKind, FeatureQuery, WarningQuery};

const MY_BEHAVIOR: &str = r#"<script>
  /** @polymerBehavior */
  MyBehavior = {
    properties: { shared: String },
    sharedMethod: function() {}
  };
</script>"#;

#[tokio::test]
async fn elements_inherit_from_imported_behaviors() {
    let (context, _) = memory_context(&[
        ("behaviors/my-behavior.html", MY_BEHAVIOR),
        (
            "my-el.html",
            r#"<link rel="import" href="behaviors/my-behavior.html">
<script>
  Polymer({
    is: 'my-el',
    behaviors: [MyBehavior],
    properties: { own: Number }
  });
</script>"#,
        ),
    ]);
    let (_, document) = analyzed_document(&context, "my-el.html").await;

    let elements = document.get_features(&FeatureQuery::kind(FeatureKind::PolymerElement));
    assert_eq!(elements.len(), 1);
    let element = elements[0].as_element().unwrap();
    assert_eq!(element.behavior_names(), ["MyBehavior"]);

    let shared = &element.members.properties["shared"];
    assert_eq!(shared.inherited_from.as_deref(), Some("MyBehavior"));
    assert_eq!(element.members.properties["own"].inherited_from, None);
    assert!(element.members.methods.contains_key("sharedMethod"));
    assert!(warning_codes(&document).is_empty(), "{:?}", warning_codes(&document));
}

#[tokio::test]
async fn cycles_see_features_declared_before_the_import() {
    let (context, _) = memory_context(&[
        (
            "a.html",
            r#"<script>
  /** @polymerBehavior */
  MyBehavior = { properties: { shared: String } };
</script>
<script type="module">import './b.html';</script>"#,
        ),
        (
            "b.html",
            r#"<link rel="import" href="a.html">
<script>
  Polymer({ is: 'b-el', behaviors: [MyBehavior] });
</script>"#,
        ),
    ]);
    let (analyzed, _) = analyzed_document(&context, "a.html").await;
    let b = analyzed.get_document(&url("b.html")).unwrap();

    let elements = b.get_features(&FeatureQuery::kind(FeatureKind::PolymerElement));
    let element = elements[0].as_element().unwrap();
    assert_eq!(element.behavior_names(), ["MyBehavior"]);
    assert!(element.members.properties.contains_key("shared"));
    let codes = warning_codes(&b);
    assert!(!codes.iter().any(|code| code == "unknown-polymer-behavior"), "{codes:?}");
}

#[tokio::test]
async fn the_last_of_several_behaviors_wins() {
    let (context, _) = memory_context(&[
        (
            "first.html",
            "<script>/** @polymerBehavior */ Dup = { properties: { fromFirst: String } };</script>",
        ),
        (
            "second.html",
            "<script>/** @polymerBehavior */ Dup = { properties: { fromSecond: String } };</script>",
        ),
        (
            "el.html",
            r#"<link rel="import" href="first.html">
<link rel="import" href="second.html">
<script>Polymer({is: 'dup-el', behaviors: [Dup]});</script>"#,
        ),
    ]);
    let (_, document) = analyzed_document(&context, "el.html").await;

    let element = features_of(&document, FeatureKind::Element)
        .into_iter()
        .find(|feature| feature.name() == Some("dup-el"))
        .unwrap();
    let element = element.as_element().unwrap();
    assert_eq!(element.behaviors.len(), 1);
    assert!(element.members.properties.contains_key("fromSecond"));
    assert!(!element.members.properties.contains_key("fromFirst"));

    let warning = element
        .warnings
        .iter()
        .find(|warning| warning.code == "multiple-polymer-behaviors")
        .unwrap();
    assert_eq!(warning.message, "Found more than one behavior named Dup.");
}

#[tokio::test]
async fn polymer_elements_pick_up_their_dom_module() {
    let (context, _) = memory_context(&[(
        "x-a.html",
        r#"<dom-module id="x-a">
  <template>
    <div id="wrapper"><slot name="footer"></slot></div>
  </template>
  <script>Polymer({is: 'x-a'});</script>
</dom-module>"#,
    )]);
    let (_, document) = analyzed_document(&context, "x-a.html").await;

    let elements = document.get_features(&FeatureQuery::kind(FeatureKind::Element));
    let element = elements[0].as_element().unwrap();
    assert_eq!(element.dom_module.as_deref(), Some("x-a"));
    assert_eq!(element.slots[0].name, "footer");
    assert_eq!(element.local_ids[0].name, "wrapper");
}

#[tokio::test]
async fn class_elements_apply_imported_mixins() {
    let (context, _) = memory_context(&[
        (
            "tap-mixin.js",
            r#"/** @mixinFunction */
const TapMixin = (base) => class extends base {
  static get properties() { return { tapped: Boolean }; }
  tap() {}
};"#,
        ),
        (
            "x-b.html",
            r#"<script src="tap-mixin.js"></script>
<script>
  /** @appliesMixin TapMixin */
  class XB extends TapMixin(HTMLElement) {}
  customElements.define('x-b', XB);
</script>"#,
        ),
    ]);
    let (_, document) = analyzed_document(&context, "x-b.html").await;

    let element = features_of(&document, FeatureKind::Element)
        .into_iter()
        .find(|feature| feature.name() == Some("x-b"))
        .unwrap();
    let element = element.as_element().unwrap();
    assert_eq!(element.mixin_names(), ["TapMixin"]);
    assert!(element.members.properties.contains_key("tapped"));
    assert!(element.members.methods.contains_key("tap"));
}

#[tokio::test]
async fn unknown_mixins_warn() {
    let (context, _) = memory_context(&[(
        "x-c.js",
        "/** @appliesMixin NowhereMixin */\nclass XC extends HTMLElement {}\ncustomElements.define('x-c', XC);",
    )]);
    let (_, document) = analyzed_document(&context, "x-c.js").await;
    assert!(warning_codes(&document).contains(&"unknown-mixin".to_string()));
}

#[tokio::test]
async fn imported_queries_stop_at_package_directories() {
    let (context, _) = memory_context(&[
        (
            "index.html",
            r#"<link rel="import" href="bower_components/paper-button/paper-button.html">
<link rel="import" href="src/my-app.html">"#,
        ),
        (
            "bower_components/paper-button/paper-button.html",
            "<script>Polymer({is: 'paper-button'});</script>",
        ),
        ("src/my-app.html", "<script>Polymer({is: 'my-app'});</script>"),
    ]);
    let (_, document) = analyzed_document(&context, "index.html").await;

    let local = document.get_features(&FeatureQuery::kind(FeatureKind::Element).imported(true));
    let names: Vec<_> = local.iter().filter_map(|feature| feature.name()).collect();
    assert_eq!(names, ["my-app"]);

    let everything = document.get_features(
        &FeatureQuery::kind(FeatureKind::Element)
            .imported(true)
            .external_packages(true),
    );
    let names: Vec<_> = everything.iter().filter_map(|feature| feature.name()).collect();
    assert_eq!(names, ["paper-button", "my-app"]);

    let by_id = document.get_features(
        &FeatureQuery::kind(FeatureKind::Element)
            .id("my-app")
            .imported(true),
    );
    assert_eq!(by_id.len(), 1);
}

#[tokio::test]
async fn relative_imports_resolve_against_the_importer() {
    let (context, _) = memory_context(&[
        ("src/app/app.html", r#"<link rel="import" href="../shared/x.html">"#),
        ("src/shared/x.html", "<script>Polymer({is: 'shared-x'});</script>"),
    ]);
    let (_, document) = analyzed_document(&context, "src/app/app.html").await;

    let imports = document.get_features(&FeatureQuery::kind(FeatureKind::HtmlImport));
    let import = imports[0].as_import().unwrap();
    assert_eq!(import.url.as_str(), "src/shared/x.html");
    assert_eq!(import.original_url, "../shared/x.html");
    assert_eq!(
        features_of(&document, FeatureKind::Element)[0].name(),
        Some("shared-x")
    );
}

#[tokio::test]
async fn analysis_gathers_features_and_warnings_across_documents() {
    let (analyzer, _) = memory_analyzer(&[
        ("a.html", "<script>Polymer({is: 'a-el', behaviors: [Missing]});</script>"),
        ("b.html", "<script>Polymer({is: 'b-el'});</script>"),
    ]);
    let analysis = analyzer.analyze(&["a.html", "b.html", "gone.html"]).await;

    let elements = analysis.get_features(&FeatureQuery::kind(FeatureKind::Element));
    let names: Vec<_> = elements.iter().filter_map(|feature| feature.name()).collect();
    assert_eq!(names, ["a-el", "b-el"]);

    let codes: Vec<_> = analysis
        .get_warnings(WarningQuery::default())
        .into_iter()
        .map(|warning| warning.code)
        .collect();
    assert!(codes.contains(&"unknown-polymer-behavior".to_string()));
    assert!(codes.contains(&"could-not-load".to_string()));
    assert!(analysis.get_document("gone.html").is_err());
    assert_eq!(analysis.documents().len(), 2);
}
