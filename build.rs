// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common argument: answer trust questions with yes
fn yes_arg() -> Arg {
    Arg::new("yes")
        .short('y')
        .long("yes")
        .action(ArgAction::SetTrue)
        .help("Answer yes to every trust question")
}

fn build_cli() -> Command {
    Command::new("zerodeploy")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Zerodeploy Contributors")
        .about("Decentralized software deployment with signed feeds")
        .subcommand_required(true)
        .arg(
            Arg::new("home")
                .long("home")
                .value_name("DIR")
                .global(true)
                .help("Base directory for configuration, caches and keys"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Show debug output"),
        )
        .subcommand(
            Command::new("select")
                .about("Choose implementations for an interface and its dependencies")
                .arg(Arg::new("interface").required(true).help("Interface URI or absolute path of a local feed"))
                .arg(Arg::new("command").long("command").help("Command to select (default: run)"))
                .arg(Arg::new("os").long("os").help("Target operating system"))
                .arg(Arg::new("cpu").long("cpu").help("Target CPU"))
                .arg(
                    Arg::new("source")
                        .long("source")
                        .action(ArgAction::SetTrue)
                        .help("Select source code instead of binaries"),
                )
                .arg(
                    Arg::new("version")
                        .long("version")
                        .value_name("RANGE")
                        .help("Acceptable versions of the interface"),
                )
                .arg(
                    Arg::new("version_for")
                        .long("version-for")
                        .num_args(2)
                        .value_names(["URI", "RANGE"])
                        .action(ArgAction::Append)
                        .help("Acceptable versions of another interface"),
                )
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .action(ArgAction::SetTrue)
                        .help("Never use the network"),
                )
                .arg(
                    Arg::new("refresh")
                        .long("refresh")
                        .action(ArgAction::SetTrue)
                        .help("Download every feed again, even when cached"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the selections as JSON"),
                )
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("import")
                .about("Import a signed feed file into the cache")
                .arg(Arg::new("file").required(true).help("Path to the feed file"))
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("trust")
                .about("Trusted keys per domain")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List trusted keys and their domains"))
                .subcommand(
                    Command::new("add")
                        .about("Trust a key to sign feeds from a domain")
                        .arg(Arg::new("fingerprint").required(true).help("Key fingerprint"))
                        .arg(Arg::new("domain").required(true).help("Domain")),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Stop trusting a key for a domain")
                        .arg(Arg::new("fingerprint").required(true).help("Key fingerprint"))
                        .arg(Arg::new("domain").required(true).help("Domain")),
                ),
        )
        .subcommand(
            Command::new("key")
                .about("OpenPGP keyring")
                .subcommand_required(true)
                .subcommand(
                    Command::new("import")
                        .about("Import a public key")
                        .arg(Arg::new("file").required(true).help("Path to the key file")),
                )
                .subcommand(Command::new("list").about("List keys in the keyring")),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(Arg::new("key").required(true).help("Setting name"))
                        .arg(Arg::new("value").required(true).help("New value")),
                ),
        )
}

/// Render `cmd` as `<name>.1`, then each subcommand as `<name>-<sub>.1`
fn render_pages(cmd: &Command, name: &str, dir: &Path) -> io::Result<()> {
    let mut page = Vec::new();
    Man::new(cmd.clone()).render(&mut page)?;
    fs::write(dir.join(format!("{}.1", name)), page)?;

    for sub in cmd.get_subcommands() {
        render_pages(sub, &format!("{}-{}", name, sub.get_name()), dir)?;
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Pages land in OUT_DIR; packagers copy them from there
    let Some(out_dir) = env::var_os("OUT_DIR") else {
        return;
    };
    let man_dir = PathBuf::from(out_dir).join("man");
    let cli = build_cli();
    let result = fs::create_dir_all(&man_dir).and_then(|()| render_pages(&cli, cli.get_name(), &man_dir));
    if let Err(e) = result {
        println!("cargo:warning=man pages not generated in {}: {}", man_dir.display(), e);
    }
}
