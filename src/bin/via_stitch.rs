use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use via_stitch::board::{from_mm, load_board};
use via_stitch::keepout::add_track_keepouts;
use via_stitch::stitch::{parse_length_mm, run, StitchParams};

fn print_usage(program: &str) {
    eprintln!("Usage: {} <board.xml> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --params <file.json>     Override parameters from a JSON file");
    eprintln!("  --net <name>             Net to stitch (default: GND, then /GND)");
    eprintln!("  --step <mm>              Minimum spacing between vias (0 disables)");
    eprintln!("  --size <mm>              Via diameter");
    eprintln!("  --drill <mm>             Via drill");
    eprintln!("  --clearance <mm>         Clearance around each via");
    eprintln!("  --selected               Only stitch selected zones");
    eprintln!("  --star                   Staggered via pattern");
    eprintln!("  --random                 Jitter via positions");
    eprintln!("  --seed <n>               Seed for --random");
    eprintln!("  --delete                 Remove previously stitched vias instead");
    eprintln!("  --debug                  Log the cell grid after every pass");
    eprintln!("  --keepouts <mm>          Add clearance keepouts around selected tracks and exit");
    eprintln!("  -o, --output <file>      Write to another file instead of in place");
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{} needs a value", flag),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("via_stitch");
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(program);
        return Ok(());
    }

    let input = &args[1];
    let mut doc = load_board(input)?;
    let mut params = StitchParams::for_board(&doc.board);
    let mut output = input.clone();
    let mut keepout_clearance = None;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--params" => {
                let path = next_value(&args, &mut i, flag)?;
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read params file {}", path))?;
                params = params
                    .merged_with_json(&text)
                    .with_context(|| format!("Invalid params file {}", path))?;
            }
            "--net" => params.net_name = next_value(&args, &mut i, flag)?.to_string(),
            "--step" => params.step_mm = parse_length_mm("step", next_value(&args, &mut i, flag)?)?,
            "--size" => params.via_size_mm = parse_length_mm("via size", next_value(&args, &mut i, flag)?)?,
            "--drill" => params.drill_mm = parse_length_mm("drill", next_value(&args, &mut i, flag)?)?,
            "--clearance" => {
                params.clearance_mm = parse_length_mm("clearance", next_value(&args, &mut i, flag)?)?
            }
            "--selected" => params.only_selected_area = true,
            "--star" => params.star = true,
            "--random" => params.randomize = true,
            "--seed" => {
                let value = next_value(&args, &mut i, flag)?;
                params.seed = Some(value.parse().with_context(|| format!("Invalid seed '{}'", value))?);
            }
            "--delete" => params.delete_vias = true,
            "--debug" => params.debug = true,
            "--keepouts" => {
                keepout_clearance = Some(parse_length_mm("clearance", next_value(&args, &mut i, flag)?)?)
            }
            "-o" | "--output" => output = next_value(&args, &mut i, flag)?.to_string(),
            other => {
                print_usage(program);
                bail!("Unknown option '{}'", other);
            }
        }
        i += 1;
    }

    if let Some(clearance_mm) = keepout_clearance {
        let added = add_track_keepouts(&mut doc.board, from_mm(clearance_mm))?;
        doc.save(&output)?;
        info!("{} keepouts written to {}", added, output);
        return Ok(());
    }

    let config = params.validate()?;
    let report = run(&config, &mut doc.board)?;
    doc.save(&output)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
