use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use p256::ecdsa::SigningKey;
use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use sealbill_core::config::Config;
use sealbill_core::invoice::sign::{ClaimsVerifier, InvoiceSigner};
use sealbill_core::invoice::{FinalizedInvoice, InvoiceInput, SignedInvoice};
use sealbill_core::render::{Catalog, InvoicePdf, PdfCanvas, WordWrap};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sealbill")]
#[command(about = "Sign, verify and render invoices")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a P-256 key pair.
    Keygen {
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        public_key: PathBuf,
    },
    /// Print the signed claims token for an invoice.
    Sign {
        #[arg(long)]
        invoice: PathBuf,
        #[arg(long)]
        private_key: PathBuf,
    },
    /// Check a token and print its claims.
    Verify {
        #[arg(long)]
        token: String,
        #[arg(long)]
        public_key: PathBuf,
        /// Also require the claims to match this invoice.
        #[arg(long)]
        invoice: Option<PathBuf>,
    },
    /// Write the verification code of an invoice as PNG.
    Qr {
        #[arg(long)]
        invoice: PathBuf,
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Render an invoice to PDF.
    Render {
        #[arg(long)]
        invoice: PathBuf,
        #[arg(long)]
        private_key: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_invoice(path: &Path) -> Result<FinalizedInvoice> {
    let json = read_to_string(path)?;
    let mut input: InvoiceInput = serde_json::from_str(&json)
        .with_context(|| format!("invalid invoice JSON in {}", path.display()))?;
    // Logo paths are relative to the invoice file.
    if let (Some(logo), Some(dir)) = (input.logo_path.as_mut(), path.parent()) {
        if logo.is_relative() {
            *logo = dir.join(&*logo);
        }
    }
    let invoice = FinalizedInvoice::try_from(input)
        .with_context(|| format!("invalid invoice {}", path.display()))?;
    Ok(invoice)
}

fn load_signer(path: &Path) -> Result<InvoiceSigner> {
    let pem = read_to_string(path)?;
    InvoiceSigner::from_pem(&pem).with_context(|| format!("invalid private key {}", path.display()))
}

fn sign_invoice(invoice: &Path, private_key: &Path) -> Result<SignedInvoice> {
    let signer = load_signer(private_key)?;
    let signed = load_invoice(invoice)?.sign(&signer)?;
    Ok(signed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Keygen {
            private_key,
            public_key,
        } => {
            let key = SigningKey::random(&mut rand_core::OsRng);
            let private_pem = key
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| anyhow::anyhow!("failed to encode private key: {e}"))?;
            let public_pem = key
                .verifying_key()
                .to_public_key_pem(LineEnding::LF)
                .map_err(|e| anyhow::anyhow!("failed to encode public key: {e}"))?;
            std::fs::write(&private_key, private_pem.as_bytes())
                .with_context(|| format!("failed to write {}", private_key.display()))?;
            std::fs::write(&public_key, public_pem.as_bytes())
                .with_context(|| format!("failed to write {}", public_key.display()))?;
            tracing::info!(
                private_key = %private_key.display(),
                public_key = %public_key.display(),
                "generated key pair"
            );
        }
        Commands::Sign {
            invoice,
            private_key,
        } => {
            let signed = sign_invoice(&invoice, &private_key)?;
            println!("{}", signed.token());
        }
        Commands::Verify {
            token,
            public_key,
            invoice,
        } => {
            let pem = read_to_string(&public_key)?;
            let verifier = ClaimsVerifier::from_pem(&pem)?;
            let claims = match invoice {
                Some(path) => verifier.verify_invoice(token.trim(), &load_invoice(&path)?)?,
                None => verifier.verify(token.trim())?,
            };
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::Qr {
            invoice,
            private_key,
            output,
        } => {
            let signed = sign_invoice(&invoice, &private_key)?;
            let code = signed.verification_code()?;
            std::fs::write(&output, code.png())
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(output = %output.display(), modules = code.modules(), "wrote verification code");
        }
        Commands::Render {
            invoice,
            private_key,
            output,
            config,
        } => {
            let config = match config {
                Some(path) => Config::from_json_file(&path)?,
                None => Config::default(),
            };
            let signed = sign_invoice(&invoice, &private_key)?;
            let catalog = Catalog::default().with_default_locale(config.locale().clone());
            let canvas = PdfCanvas::new(signed.data().reference(), config.layout())?;
            let rendered = InvoicePdf::new(&signed, &catalog, &WordWrap, config.layout())
                .generate(canvas)
                .await?;
            std::fs::write(&output, &rendered.output)
                .with_context(|| format!("failed to write {}", output.display()))?;

            for overflow in &rendered.overflows {
                eprintln!("warning: {overflow}");
            }
            println!("{} page(s) written to {}", rendered.page_count, output.display());
        }
    }

    Ok(())
}
