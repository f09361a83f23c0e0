use clap::ValueEnum;

/// How results are printed
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per warning or feature, grouped by document
    #[default]
    #[value(name = "text")]
    Text,

    /// A single JSON document on stdout
    #[value(name = "json")]
    Json,
}
