use std::fs;
use std::io::Read;
use std::path::PathBuf;

use futures::stream::{FuturesOrdered, StreamExt};

use serde_json::Value;

use structopt::StructOpt;

use sendgrid_email::delivery::sendgrid::SendGridFactory;
use sendgrid_email::delivery::ClientFactory;
use sendgrid_email::machine::SEND_EMAIL;
use sendgrid_email::{config, Exit, SendEmail};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sendgrid-email",
    about = "Run the \"Send email\" machine on one or more JSON parameter bags."
)]
struct Opt {
    /// Provider config file (TOML)
    #[structopt(short, long)]
    config: Option<String>,

    /// Print the machine definition and exit
    #[structopt(long)]
    describe: bool,

    /// Parameters: a JSON object, or an array of objects. Read from stdin if omitted.
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,
}

fn read_input(path: Option<&PathBuf>) -> Result<Value, Box<dyn std::error::Error>> {
    let content = match path {
        Some(p) => fs::read_to_string(p)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    Ok(serde_json::from_str(&content)?)
}

/// A single bag runs once; an array runs every bag concurrently
fn into_bags(input: Value) -> Vec<Value> {
    match input {
        Value::Array(bags) => bags,
        bag => vec![bag],
    }
}

async fn run(opt: Opt) -> Result<bool, Box<dyn std::error::Error>> {
    let provider_config = config::load_config(opt.config.as_deref())?;
    let factory = SendGridFactory::new(&provider_config)?;
    let machine = SendEmail::new(factory, &provider_config);

    let bags = into_bags(read_input(opt.input.as_ref())?);
    log::info!("Running {} send(s)", bags.len());

    let (lines, all_ok) = run_bags(&machine, &bags).await;
    for line in &lines {
        println!("{}", line);
    }

    Ok(all_ok)
}

/// Run every bag concurrently. Returns one exit line per bag, in input
/// order, and whether every bag took `success`.
async fn run_bags<F: ClientFactory>(machine: &SendEmail<F>, bags: &[Value]) -> (Vec<Value>, bool) {
    let exits: Vec<Exit> = bags
        .iter()
        .map(|bag| machine.run(bag))
        .collect::<FuturesOrdered<_>>()
        .collect()
        .await;

    let all_ok = exits.iter().all(|e| e.is_success());
    let lines = exits.iter().map(|e| e.to_json()).collect();

    (lines, all_ok)
}

#[tokio::main]
async fn main() {
    // Init logger
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    if opt.describe {
        match serde_json::to_string_pretty(&SEND_EMAIL) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                log::error!("Failed to render definition: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match run(opt).await {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    }
}
