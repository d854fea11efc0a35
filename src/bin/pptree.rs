//! Command-line interface for pptree
//!
//! Replays a recorded tag-event stream (JSON) through the tree builder, runs
//! the restructuring pipeline and prints the resulting tree.
//!
//! Usage:
//!   pptree convert `<events.json>` [--pipeline full|structural] [--permissive] [--flat]
//!   pptree list-tags

use clap::{Arg, ArgAction, Command};

use pptree::pptree::driver::{replay, TagEvent, TreeBuilder, SUPPORTED_TAGS};
use pptree::pptree::pipeline::{Converter, PipelineSpec, Strictness};

fn main() {
    env_logger::init();

    let matches = Command::new("pptree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts tag-annotated C/C++ parses into a preprocessor-aware syntax tree")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("convert")
                .about("Build a tree from a recorded tag stream and run the pipeline")
                .arg(
                    Arg::new("path")
                        .help("Path to a JSON file holding the recorded tag events")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("pipeline")
                        .long("pipeline")
                        .help("Rule sequence to run ('full' or 'structural')")
                        .default_value("full"),
                )
                .arg(
                    Arg::new("permissive")
                        .long("permissive")
                        .help("Log shape mismatches instead of aborting")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("flat")
                        .long("flat")
                        .help("Print the tree as built, before any pass")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-tags").about("List the tags that create tree nodes"))
        .get_matches();

    match matches.subcommand() {
        Some(("convert", convert_matches)) => {
            let path = convert_matches.get_one::<String>("path").unwrap();
            let pipeline = convert_matches.get_one::<String>("pipeline").unwrap();
            let permissive = convert_matches.get_flag("permissive");
            let flat = convert_matches.get_flag("flat");
            handle_convert_command(path, pipeline, permissive, flat);
        }
        Some(("list-tags", _)) => {
            handle_list_tags_command();
        }
        _ => unreachable!(),
    }
}

/// Handle the convert command
fn handle_convert_command(path: &str, pipeline: &str, permissive: bool, flat: bool) {
    let spec = match pipeline {
        "full" => PipelineSpec::Full,
        "structural" => PipelineSpec::Structural,
        other => {
            eprintln!("Error: unknown pipeline '{}'", other);
            std::process::exit(1);
        }
    };

    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });
    let events: Vec<TagEvent> = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error parsing events: {}", e);
        std::process::exit(1);
    });

    let mut builder = TreeBuilder::new();
    replay(&events, &mut builder);
    let mut tree = builder.finish().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if !flat {
        let strictness = if permissive {
            Strictness::Permissive
        } else {
            Strictness::Strict
        };
        let converter = Converter::with_spec(spec).strictness(strictness);
        if let Err(e) = converter.convert(&mut tree) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    println!("{}", tree.render(tree.root()));
}

/// Handle the list-tags command
fn handle_list_tags_command() {
    let mut tags: Vec<&str> = SUPPORTED_TAGS.iter().copied().collect();
    tags.sort_unstable();
    for tag in tags {
        println!("{}", tag);
    }
}
