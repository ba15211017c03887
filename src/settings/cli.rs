use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "loan-backoffice", about = "Loan back office admin API")]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long)]
    pub settings: Option<String>,
}
