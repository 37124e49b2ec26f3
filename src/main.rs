use clap::Parser;
use log::{debug, error};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use logjson::component::codec::json;
use logjson::error::*;
use logjson::{registry, value, Codec, EventFactory, LegacyEventFactory, New, StdEventFactory};

/// Decodes newline-delimited JSON payloads from stdin and writes the resulting events to stdout.
///
/// Lines that aren't valid JSON come out as events with the line in the `message` field and
/// the `_jsonparsefailure` tag.
#[derive(Debug, Parser)]
#[command(name = "logjson", version)]
struct Args {
    /// Character encoding of the input
    #[arg(long, default_value = "UTF-8")]
    charset: String,

    /// Indent the output
    #[arg(long)]
    pretty: bool,

    /// Include event metadata in the output
    #[arg(long)]
    metadata: bool,

    /// Build events through the generic value parser instead of the direct JSON constructor
    #[arg(long)]
    legacy_events: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("logjson: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let events: Arc<dyn EventFactory> = if args.legacy_events {
        Arc::new(LegacyEventFactory)
    } else {
        Arc::new(StdEventFactory)
    };
    let codec = registry().codec(json::NAME)
        .ok_or_else(|| Error::new(ErrorId::Unknown, "json codec isn't registered"))?
        .new(New {
            config: value!{{
                "charset" => args.charset.as_str(),
                "pretty" => args.pretty,
                "metadata" => args.metadata,
            }}.into(),
            events,
        })
        .context("creating codec")?;
    debug!("codec created: {:?}", args);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut line = Vec::new();
    let mut input = stdin.lock();
    loop {
        line.clear();
        let n = input.read_until(b'\n', &mut line).wrap_err_id(ErrorId::Io)
            .context("reading stdin")?;
        if n == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        process_line(&*codec, &line, &mut out)?;
    }
    out.flush().wrap_err_id(ErrorId::Io)
        .context("writing stdout")
}

fn process_line(codec: &dyn Codec, line: &[u8], out: &mut impl Write) -> Result<()> {
    let mut events = Vec::new();
    codec.decode(line, &mut |e| events.push(e));
    for event in &events {
        let mut encoded = String::new();
        codec.encode(event, &mut |_, s| encoded = s)?;
        out.write_all(encoded.as_bytes()).wrap_err_id(ErrorId::Io)
            .context("writing stdout")?;
    }
    Ok(())
}
