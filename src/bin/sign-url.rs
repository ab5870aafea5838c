//! Issuer-side tooling: generate keys and sign proxy URLs.

use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use url::form_urlencoded;

use signed_proxy::codec::decode_hex;
use signed_proxy::security::{sign_request, TrustedKey};

#[derive(Parser)]
#[command(name = "sign-url")]
#[command(about = "Key generation and URL signing for the signed proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an Ed25519 keypair
    Keygen,
    /// Sign a target url for a bot id
    Sign {
        /// Hex encoded 32-byte secret key (from `keygen`)
        #[arg(short, long)]
        secret: String,

        /// Issuer id
        #[arg(short, long, allow_hyphen_values = true)]
        bot_id: i128,

        /// Target url, absolute or origin-relative
        #[arg(short, long)]
        url: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
            let public_key = TrustedKey::from(signing_key.verifying_key()).to_spki_base64()?;
            println!("PUBLIC_KEY={public_key}");
            println!("SECRET_KEY={}", hex::encode(signing_key.to_bytes()));
        }
        Commands::Sign {
            secret,
            bot_id,
            url,
        } => {
            let seed: [u8; 32] = decode_hex(secret.trim())
                .try_into()
                .map_err(|_| "secret must be 64 hex characters")?;
            let signing_key = SigningKey::from_bytes(&seed);
            let signed = sign_request(&signing_key, bot_id, &url);

            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("url", &url)
                .append_pair("botId", &bot_id.to_string())
                .append_pair("signed", &signed)
                .finish();

            println!("signed={signed}");
            println!("query=?{query}");
        }
    }

    Ok(())
}
