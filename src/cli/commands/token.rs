use clap::Subcommand;
use serde_json::json;

use crate::auth::{Role, TokenDecoder, TokenIssuer};
use crate::cli::utils::{output_error, output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a signed identity token with the configured secret")]
    Mint {
        #[arg(long, help = "User id")]
        id: i64,
        #[arg(long, help = "Role name, e.g. COMPANY_ADMIN, MEMBER, SUPER_ADMIN")]
        role: String,
        #[arg(long, help = "Company id (omit for no company)")]
        company: Option<i64>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Decode a token the way the gateway would")]
    Inspect {
        #[arg(help = "Token to decode")]
        token: String,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint { id, role, company, hours } => {
            let role = Role::parse(&role).ok_or_else(|| anyhow::anyhow!("invalid role name '{}'", role))?;

            let mut security = config.security.clone();
            if let Some(hours) = hours {
                security.jwt_expiry_hours = hours;
            }

            let token = TokenIssuer::from_config(&security)?.mint(id, role, company)?;

            match output_format {
                OutputFormat::Json => output_success(output_format, "Token minted", Some(json!({ "token": token }))),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token } => {
            let decoder = TokenDecoder::from_config(&config.security)?;

            match decoder.decode(&token) {
                Ok(principal) => output_fields(
                    output_format,
                    json!({
                        "verified": decoder.verifies_signatures(),
                        "id": principal.id(),
                        "role": principal.role().as_str(),
                        "company_id": principal.tenant_id(),
                    }),
                ),
                Err(e) => {
                    output_error(output_format, &e.to_string(), Some("INVALID_TOKEN"))?;
                    Err(anyhow::anyhow!("token did not decode"))
                }
            }
        }
    }
}
