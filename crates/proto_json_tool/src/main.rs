use clap::{Parser, Subcommand};
use proto_json_tool as tool;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "proto-json",
    about = "Convert between JSON fixtures and protobuf wire format"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a JSON fixture into protobuf wire format
    Encode {
        #[arg(short, long)]
        proto: PathBuf,
        /// Import root (defaults to the proto file's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode protobuf wire format into JSON
    Decode {
        #[arg(short, long)]
        proto: PathBuf,
        #[arg(short, long)]
        root: Option<PathBuf>,
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let encoder = tool::Encoder::without_cache();
    match cli.cmd {
        Cmd::Encode {
            proto,
            root,
            message,
            input,
            output,
        } => {
            let bytes = encoder.encode(&tool::EncodeTarget {
                json_file: &input,
                proto_file: &proto,
                message_type: &message,
                proto_root: root.as_deref(),
            })?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => std::io::stdout().write_all(&bytes)?,
            }
            Ok(())
        }
        Cmd::Decode {
            proto,
            root,
            message,
            input,
        } => {
            let schema = encoder.schema(&proto, root.as_deref())?;
            let desc = schema.message(&message)?;
            let bytes = std::fs::read(&input)?;
            let json = tool::decode_to_json(&bytes, &desc)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
    }
}
