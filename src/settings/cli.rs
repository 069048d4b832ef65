use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Session issuance, validation and refresh service")]
pub struct Cli {
    /// Path to the settings file, without or with the `.toml` extension.
    #[arg(long)]
    pub settings: Option<String>,
}
