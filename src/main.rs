//! uVision helper CLI
//!
//! Entry point for the `uvhelper` command-line tool.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use uvhelper::locate;
use uvhelper::report::Reporter;
use uvhelper::settings::{Settings, ENV_KEIL_PACK, ENV_ST_SOFTWARE, SETTINGS_FILE};
use uvhelper::strap::{self, StrapOptions};
use uvhelper::stub::Snapshot;
use uvhelper::{Document, NodeRef};

#[derive(Parser)]
#[command(name = "uvhelper")]
#[command(about = "Keil uVision project staging, stub mirroring and project file tooling", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage SPL, CMSIS core and device family pack sources into the project
    Strap {
        /// ST standard peripheral software install root
        #[arg(long)]
        st_software_dir: Option<PathBuf>,

        /// Keil pack installation root
        #[arg(long)]
        keil_pack_dir: Option<PathBuf>,

        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Device family pack name (default: from settings)
        #[arg(long)]
        dfp_name: Option<String>,

        /// Standard peripheral library name (default: from settings)
        #[arg(long)]
        spl_name: Option<String>,

        /// Remove previously staged files under Lib/ first
        #[arg(long)]
        clean: bool,

        /// Skip the SPL register rename fix for armclang
        #[arg(long)]
        no_amend_spl: bool,
    },

    /// Mirror the project into a stub tree for clangd
    Stub {
        #[command(subcommand)]
        action: StubCommands,
    },

    /// Inspect or edit the project file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum StubCommands {
    /// Copy referenced files into the stub tree and write compile_commands.json
    Gen {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Stub directory (default: from settings)
        #[arg(long)]
        stub_dir: Option<PathBuf>,
    },

    /// Copy files edited in the stub tree back into the project
    Sync {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Stub directory (default: from settings)
        #[arg(long)]
        stub_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print targets, groups, files and any repairs made while loading
    Show {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Parse the project file and rewrite it in canonical form
    Normalize {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Add a target carrying the stock option tree
    AddTarget {
        /// Target name
        name: String,

        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Add a file group under a target
    AddGroup {
        /// Target name or zero-based index
        target: String,

        /// Group name
        name: String,

        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// Add a source file to a group
    AddFile {
        /// Target name or zero-based index
        target: String,

        /// Group name or zero-based index
        group: String,

        /// Project-relative file path
        path: String,

        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Strap {
            st_software_dir,
            keil_pack_dir,
            project_dir,
            dfp_name,
            spl_name,
            clean,
            no_amend_spl,
        } => {
            run_strap(
                st_software_dir,
                keil_pack_dir,
                project_dir,
                dfp_name,
                spl_name,
                clean,
                no_amend_spl,
            );
        }
        Commands::Stub { action } => match action {
            StubCommands::Gen {
                project_dir,
                stub_dir,
            } => {
                run_stub(project_dir, stub_dir, false);
            }
            StubCommands::Sync {
                project_dir,
                stub_dir,
            } => {
                run_stub(project_dir, stub_dir, true);
            }
        },
        Commands::Config { action } => match action {
            ConfigCommands::Show { project_dir } => {
                run_config_show(project_dir);
            }
            ConfigCommands::Normalize { project_dir } => {
                run_config_normalize(project_dir);
            }
            ConfigCommands::AddTarget { name, project_dir } => {
                run_config_add_target(&name, project_dir);
            }
            ConfigCommands::AddGroup {
                target,
                name,
                project_dir,
            } => {
                run_config_add_group(&target, &name, project_dir);
            }
            ConfigCommands::AddFile {
                target,
                group,
                path,
                project_dir,
            } => {
                run_config_add_file(&target, &group, &path, project_dir);
            }
        },
    }
}

fn run_strap(
    st_software_dir: Option<PathBuf>,
    keil_pack_dir: Option<PathBuf>,
    project_dir: PathBuf,
    dfp_name: Option<String>,
    spl_name: Option<String>,
    clean: bool,
    no_amend_spl: bool,
) {
    let settings = load_settings(&project_dir);
    let st_software_dir = match st_software_dir.or(settings.st_software_dir) {
        Some(dir) => dir,
        None => {
            eprintln!(
                "Error: st_software_dir not set; pass --st-software-dir, set {} or add it to {}",
                ENV_ST_SOFTWARE, SETTINGS_FILE
            );
            process::exit(1);
        }
    };
    let keil_pack_dir = match keil_pack_dir.or(settings.keil_pack_dir) {
        Some(dir) => dir,
        None => {
            eprintln!(
                "Error: keil_pack_dir not set; pass --keil-pack-dir, set {} or add it to {}",
                ENV_KEIL_PACK, SETTINGS_FILE
            );
            process::exit(1);
        }
    };

    let opts = StrapOptions {
        st_software_dir,
        keil_pack_dir,
        project_dir,
        dfp_name: dfp_name.unwrap_or(settings.dfp_name),
        spl_name: spl_name.unwrap_or(settings.spl_name),
        clean,
        amend_spl: !no_amend_spl,
    };

    let reporter = Reporter::new();
    if let Err(e) = strap::bootstrap(&opts, &reporter) {
        eprintln!("Error staging packs: {}", e);
        process::exit(1);
    }
    println!("{}", reporter.tally());
}

fn run_stub(project_dir: PathBuf, stub_dir: Option<PathBuf>, sync: bool) {
    let settings = load_settings(&project_dir);
    let stub_dir = stub_dir.unwrap_or_else(|| settings.stub_dir_in(&project_dir));
    let (_, doc) = load_document(&project_dir);

    let reporter = Reporter::new();
    let snapshot = match Snapshot::collect(&doc, &project_dir, &stub_dir, &reporter) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error collecting the mirror plan: {}", e);
            process::exit(1);
        }
    };
    println!("collected {} files", snapshot.links().len());

    if sync {
        snapshot.sync_back(&reporter);
    } else if let Err(e) = snapshot.generate(&reporter) {
        eprintln!("Error generating the stub tree: {}", e);
        process::exit(1);
    }
    println!("{}", reporter.tally());
}

fn run_config_show(project_dir: PathBuf) {
    let (_, doc) = load_document(&project_dir);
    for target in doc.project().targets().iter() {
        println!("target: {}", target.name());
        if let Ok(includes) = doc.include_paths(target.name()) {
            if !includes.common.is_empty() {
                println!("  includes (common): {}", includes.common.join(";"));
            }
            if !includes.compiler.is_empty() {
                println!("  includes (compiler): {}", includes.compiler.join(";"));
            }
            if !includes.assembler.is_empty() {
                println!("  includes (assembler): {}", includes.assembler.join(";"));
            }
        }
        for group in target.groups().iter() {
            println!("  group: {}", group.name());
            for file in group.files().iter() {
                println!("    {}", file.file_path());
            }
        }
    }
}

fn run_config_normalize(project_dir: PathBuf) {
    let (path, mut doc) = load_document(&project_dir);
    write_document(&mut doc, &path);
    println!("rewrote {}", path.display());
}

fn run_config_add_target(name: &str, project_dir: PathBuf) {
    let (path, mut doc) = load_document(&project_dir);
    if let Err(e) = doc.add_target(name) {
        eprintln!("Error adding target: {}", e);
        process::exit(1);
    }
    write_document(&mut doc, &path);
    println!("added target {}", name);
}

fn run_config_add_group(target: &str, name: &str, project_dir: PathBuf) {
    let (path, mut doc) = load_document(&project_dir);
    if let Err(e) = doc.add_group(node_ref(target), name) {
        eprintln!("Error adding group: {}", e);
        process::exit(1);
    }
    write_document(&mut doc, &path);
    println!("added group {}", name);
}

fn run_config_add_file(target: &str, group: &str, file_path: &str, project_dir: PathBuf) {
    let (path, mut doc) = load_document(&project_dir);
    if let Err(e) = doc.add_file(node_ref(target), node_ref(group), file_path) {
        eprintln!("Error adding file: {}", e);
        process::exit(1);
    }
    write_document(&mut doc, &path);
    println!("added file {}", file_path);
}

/// All-digit arguments address nodes by position, anything else by name.
fn node_ref(text: &str) -> NodeRef<'_> {
    match text.parse::<usize>() {
        Ok(index) => NodeRef::Index(index),
        Err(_) => NodeRef::Name(text),
    }
}

fn load_settings(project_dir: &Path) -> Settings {
    match Settings::load(project_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn load_document(project_dir: &Path) -> (PathBuf, Document) {
    let path = match locate::find_project_file(project_dir) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    println!("found project file {}", path.display());
    let doc = match Document::load_file(&path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error loading {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    for warning in doc.warnings() {
        println!("repair: {}", warning);
    }
    (path, doc)
}

fn write_document(doc: &mut Document, path: &Path) {
    if let Err(e) = doc.write(path) {
        eprintln!("Error writing {}: {}", path.display(), e);
        process::exit(1);
    }
}
