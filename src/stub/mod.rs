//! Stub tree mirroring
//!
//! Keil projects reference sources with Windows-flavored relative paths
//! that IDE tooling elsewhere cannot follow. The stub commands mirror
//! every file the project references into a separate tree and write a
//! `compile_commands.json` beside them, giving clangd a self-contained
//! view of the build. Files edited inside the mirror are copied back by
//! modification time.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use uvconfig::Document;

use crate::fsops;
use crate::pool;
use crate::report::Reporter;

/// armclang predefines appended to every entry so clangd accepts the
/// compiler-specific headers the packs ship.
const ARMCLANG_DEFINES: [&str; 2] = ["__ARMCC_VERSION=6230050", "__ARM_COMPAT_H"];

#[derive(Debug, Error)]
pub enum StubError {
    #[error("stub dir {} must not contain the project dir {}", .stub.display(), .project.display())]
    StubContainsProject { stub: PathBuf, project: PathBuf },
    #[error(transparent)]
    Config(#[from] uvconfig::ConfigError),
    #[error("cannot serialize compile commands: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One mirrored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub project_path: PathBuf,
    pub stub_path: PathBuf,
}

/// Compile settings of one target, flattened from the project file.
#[derive(Debug, Clone, Default)]
pub struct TargetCompileInfo {
    pub name: String,
    pub common_includes: Vec<String>,
    pub c_includes: Vec<String>,
    pub asm_includes: Vec<String>,
    pub c_defines: Vec<String>,
    pub asm_defines: Vec<String>,
    /// Stored file paths in project order, kept even when the file is
    /// missing on disk so the compile database stays complete.
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CompileCommand {
    directory: String,
    command: String,
    file: String,
    output: String,
}

/// Read-only view of everything the stub commands need: the per-target
/// compile settings plus the deduplicated list of files to mirror.
#[derive(Debug)]
pub struct Snapshot {
    project_dir: PathBuf,
    stub_dir: PathBuf,
    targets: Vec<TargetCompileInfo>,
    links: Vec<Link>,
}

impl Snapshot {
    /// Walks the project and builds the mirror plan.
    ///
    /// Creates the stub directory, then collects the referenced source
    /// files, everything under the include paths and the project's
    /// markdown notes. Files that resolve outside the project tree are
    /// reported and skipped.
    pub fn collect(
        doc: &Document,
        project_dir: &Path,
        stub_dir: &Path,
        reporter: &Reporter,
    ) -> Result<Self, StubError> {
        fs::create_dir_all(stub_dir)?;
        let project_dir = fs::canonicalize(project_dir)?;
        let stub_dir = fs::canonicalize(stub_dir)?;
        if project_dir.starts_with(&stub_dir) {
            return Err(StubError::StubContainsProject {
                stub: stub_dir,
                project: project_dir,
            });
        }

        let targets = target_infos(doc)?;
        let mut sources = BTreeSet::new();

        for info in &targets {
            for stored in &info.files {
                let path = resolve_stored(&project_dir, stored);
                match fs::canonicalize(&path) {
                    Ok(canonical) if canonical.is_file() => {
                        sources.insert(canonical);
                    }
                    _ => reporter
                        .skipped(&format!("file {} not found, dropped", path.display())),
                }
            }
            let include_sets = info
                .common_includes
                .iter()
                .chain(&info.c_includes)
                .chain(&info.asm_includes);
            for stored in include_sets {
                let path = resolve_stored(&project_dir, stored);
                if path.is_dir() {
                    collect_tree(&path, &mut sources);
                } else if let Ok(canonical) = fs::canonicalize(&path) {
                    sources.insert(canonical);
                }
            }
        }
        collect_markdowns(&project_dir, &stub_dir, &mut sources);

        let mut links = Vec::new();
        for path in sources {
            match path.strip_prefix(&project_dir) {
                Ok(rel) => links.push(Link {
                    stub_path: stub_dir.join(rel),
                    project_path: path,
                }),
                Err(_) => {
                    reporter.skipped(&format!("skip {}, outside the project", path.display()));
                }
            }
        }

        Ok(Self {
            project_dir,
            stub_dir,
            targets,
            links,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn stub_dir(&self) -> &Path {
        &self.stub_dir
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn targets(&self) -> &[TargetCompileInfo] {
        &self.targets
    }

    /// Mirrors every link into the stub tree and writes
    /// `compile_commands.json`.
    pub fn generate(&self, reporter: &Reporter) -> Result<(), StubError> {
        let jobs: Vec<&Link> = self.links.iter().collect();
        pool::for_each_parallel(jobs, pool::DEFAULT_WORKERS, |link| {
            fsops::copy_reporting(&link.project_path, &link.stub_path, reporter);
        });

        let commands = self.compile_commands();
        let text = serde_json::to_string_pretty(&commands)?;
        fs::write(self.stub_dir.join("compile_commands.json"), text)?;
        reporter.note("wrote compile_commands.json");
        Ok(())
    }

    /// Copies files edited in the stub tree back over their project
    /// counterparts. Only strictly newer mirrors are considered, so the
    /// project side always wins a tie.
    pub fn sync_back(&self, reporter: &Reporter) {
        let jobs: Vec<&Link> = self.links.iter().collect();
        pool::for_each_parallel(jobs, pool::DEFAULT_WORKERS, |link| {
            if !link.stub_path.is_file() {
                return;
            }
            match fsops::newer_than(&link.stub_path, &link.project_path) {
                Ok(true) => {
                    fsops::copy_reporting(&link.stub_path, &link.project_path, reporter);
                }
                Ok(false) => {}
                Err(err) => {
                    let context = format!("stat {}", link.stub_path.display());
                    reporter.failed(&context, &err);
                }
            }
        });
    }

    /// One entry per stored file per target. Assembly files take the
    /// assembler include and define sets, everything else the compiler
    /// ones.
    fn compile_commands(&self) -> Vec<CompileCommand> {
        let directory = slashes_of(&self.stub_dir);
        let mut commands = Vec::new();
        for info in &self.targets {
            for stored in &info.files {
                let file = stored.replace('\\', "/");
                let output = object_path(&file);
                let assembly = is_assembly_path(&file);
                let includes = if assembly {
                    &info.asm_includes
                } else {
                    &info.c_includes
                };
                let defines = if assembly {
                    &info.asm_defines
                } else {
                    &info.c_defines
                };
                let mut parts = vec!["clang".to_string()];
                parts.extend(
                    includes
                        .iter()
                        .map(|inc| format!("-I{}", inc.replace('\\', "/"))),
                );
                parts.extend(defines.iter().map(|def| format!("-D{def}")));
                parts.push(format!("-o {output}"));
                parts.push(format!("-c {file}"));
                commands.push(CompileCommand {
                    directory: directory.clone(),
                    command: parts.join(" "),
                    file,
                    output,
                });
            }
        }
        commands
    }
}

fn target_infos(doc: &Document) -> Result<Vec<TargetCompileInfo>, uvconfig::ConfigError> {
    let mut out = Vec::new();
    for name in doc.target_names() {
        let includes = doc.include_paths(name)?;
        let defines = doc.defines(name)?;
        let mut files = Vec::new();
        for group in doc.group_names(name)? {
            files.extend(
                doc.file_paths(name, group)?
                    .into_iter()
                    .map(str::to_string),
            );
        }
        let mut c_defines = defines.compiler;
        let mut asm_defines = defines.assembler;
        for def in ARMCLANG_DEFINES {
            c_defines.push(def.to_string());
            asm_defines.push(def.to_string());
        }
        out.push(TargetCompileInfo {
            name: name.to_string(),
            common_includes: includes.common,
            c_includes: includes.compiler,
            asm_includes: includes.assembler,
            c_defines,
            asm_defines,
            files,
        });
    }
    Ok(out)
}

/// Resolves a stored project path against the project directory.
/// Stored paths may use backslash separators regardless of host.
fn resolve_stored(project_dir: &Path, stored: &str) -> PathBuf {
    let normalized = stored.replace('\\', "/");
    let path = Path::new(&normalized);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

fn collect_tree(dir: &Path, sources: &mut BTreeSet<PathBuf>) {
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            if let Ok(canonical) = fs::canonicalize(entry.path()) {
                sources.insert(canonical);
            }
        }
    }
}

/// Project notes travel with the mirror. Anything under the stub tree
/// or inside helper directories is left out.
fn collect_markdowns(project_dir: &Path, stub_dir: &Path, sources: &mut BTreeSet<PathBuf>) {
    let excludes = markdown_excludes();
    for entry in WalkDir::new(project_dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        let is_markdown = entry.file_type().is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !is_markdown || path.starts_with(stub_dir) {
            continue;
        }
        let rel = path.strip_prefix(project_dir).unwrap_or(path);
        if excludes.is_match(rel) {
            continue;
        }
        if let Ok(canonical) = fs::canonicalize(path) {
            sources.insert(canonical);
        }
    }
}

fn markdown_excludes() -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in [
        "**/*uvhelper*",
        "**/*uvhelper*/**",
        "**/*stub*",
        "**/*stub*/**",
    ] {
        builder.add(Glob::new(pattern).unwrap());
    }
    builder.build().unwrap()
}

fn is_assembly_path(file: &str) -> bool {
    let lower = file.to_ascii_lowercase();
    lower.ends_with(".s") || lower.ends_with(".asm")
}

/// Object path for a compile database entry. Mirrors how the build
/// swaps the extension in the last path component only.
fn object_path(file: &str) -> String {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
            format!("{stem}.obj")
        }
        _ => format!("{file}.obj"),
    }
}

fn slashes_of(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvconfig::ConfigNode;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    /// Project with one target, a real include tree and a few notes.
    fn fixture() -> (tempfile::TempDir, PathBuf, Document) {
        let root = tempfile::tempdir().unwrap();
        let project = root.path().join("demo");
        write(&project.join("src").join("main.c"), "int main(void) {}\n");
        write(&project.join("src").join("util.h"), "#pragma once\n");
        write(&project.join("startup.s"), "  AREA RESET\n");
        write(&project.join("README.md"), "# demo\n");
        write(&project.join("docs").join("notes.md"), "notes\n");
        write(&project.join("stub_notes.md"), "excluded\n");
        write(&root.path().join("outside.c"), "int outside;\n");

        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        doc.add_group("app", "Source").unwrap();
        doc.add_file("app", "Source", "src/main.c").unwrap();
        doc.add_file("app", "Source", "startup.s").unwrap();
        doc.add_file("app", "Source", "missing.c").unwrap();
        doc.add_file("app", "Source", "../outside.c").unwrap();
        let target = doc.project_mut().targets_mut().get_mut(0).unwrap();
        let arm_ads = target.target_option_mut().arm_ads_mut();
        arm_ads
            .cads_mut()
            .various_controls_mut()
            .set_option("IncludePath", "src");
        arm_ads
            .cads_mut()
            .various_controls_mut()
            .set_option("Define", "STM32F10X_HD;USE_STDPERIPH_DRIVER");
        arm_ads
            .aads_mut()
            .various_controls_mut()
            .set_option("Define", "ASM_ONLY");
        (root, project, doc)
    }

    fn link_for<'a>(snapshot: &'a Snapshot, tail: &str) -> Option<&'a Link> {
        snapshot
            .links()
            .iter()
            .find(|link| link.project_path.ends_with(tail))
    }

    #[test]
    fn test_enclosing_stub_dir_rejected() {
        let (root, project, doc) = fixture();
        let err = Snapshot::collect(&doc, &project, root.path(), &Reporter::new());
        assert!(matches!(err, Err(StubError::StubContainsProject { .. })));
        let same = Snapshot::collect(&doc, &project, &project, &Reporter::new());
        assert!(matches!(same, Err(StubError::StubContainsProject { .. })));
    }

    #[test]
    fn test_collect_links_project_files_and_notes() {
        let (_root, project, doc) = fixture();
        let stub = project.join("stub");
        let snapshot = Snapshot::collect(&doc, &project, &stub, &Reporter::new()).unwrap();

        assert!(link_for(&snapshot, "src/main.c").is_some());
        assert!(link_for(&snapshot, "src/util.h").is_some());
        assert!(link_for(&snapshot, "startup.s").is_some());
        assert!(link_for(&snapshot, "README.md").is_some());
        assert!(link_for(&snapshot, "docs/notes.md").is_some());
        assert!(link_for(&snapshot, "missing.c").is_none());
        assert!(link_for(&snapshot, "outside.c").is_none());
        assert!(link_for(&snapshot, "stub_notes.md").is_none());

        let main = link_for(&snapshot, "src/main.c").unwrap();
        assert_eq!(main.stub_path, snapshot.stub_dir().join("src/main.c"));
    }

    #[test]
    fn test_backslash_paths_resolve_on_any_host() {
        let dir = Path::new("/work/demo");
        assert_eq!(
            resolve_stored(dir, "Lib\\SPL\\misc.c"),
            PathBuf::from("/work/demo/Lib/SPL/misc.c")
        );
        assert_eq!(
            resolve_stored(dir, "src/main.c"),
            PathBuf::from("/work/demo/src/main.c")
        );
        assert_eq!(
            resolve_stored(dir, "/opt/shared/x.h"),
            PathBuf::from("/opt/shared/x.h")
        );
    }

    #[test]
    fn test_object_path_swaps_last_extension() {
        assert_eq!(object_path("src/main.c"), "src/main.obj");
        assert_eq!(object_path("Lib/CMSIS/startup.s"), "Lib/CMSIS/startup.obj");
        assert_eq!(object_path("a.b/c"), "a.b/c.obj");
        assert_eq!(object_path("noext"), "noext.obj");
        assert_eq!(object_path("src/.hidden"), "src/.hidden.obj");
    }

    #[test]
    fn test_assembly_detection() {
        assert!(is_assembly_path("startup.s"));
        assert!(is_assembly_path("STARTUP.S"));
        assert!(is_assembly_path("boot.asm"));
        assert!(!is_assembly_path("main.c"));
        assert!(!is_assembly_path("vectors.sx"));
    }

    #[test]
    fn test_generate_mirrors_and_writes_database() {
        let (_root, project, doc) = fixture();
        let stub = project.join("stub");
        let reporter = Reporter::new();
        let snapshot = Snapshot::collect(&doc, &project, &stub, &reporter).unwrap();
        snapshot.generate(&reporter).unwrap();

        assert!(stub.join("src").join("main.c").is_file());
        assert!(stub.join("startup.s").is_file());
        assert!(stub.join("README.md").is_file());

        let db = fs::read_to_string(stub.join("compile_commands.json")).unwrap();
        let entries: Vec<serde_json::Value> = serde_json::from_str(&db).unwrap();
        assert_eq!(entries.len(), 4);

        let main = entries
            .iter()
            .find(|e| e["file"] == "src/main.c")
            .unwrap();
        let command = main["command"].as_str().unwrap();
        assert!(command.starts_with("clang "));
        assert!(command.contains("-Isrc"));
        assert!(command.contains("-DSTM32F10X_HD"));
        assert!(command.contains("-DUSE_STDPERIPH_DRIVER"));
        assert!(command.contains("-D__ARMCC_VERSION=6230050"));
        assert!(command.ends_with("-o src/main.obj -c src/main.c"));
        assert_eq!(main["output"], "src/main.obj");

        let asm = entries
            .iter()
            .find(|e| e["file"] == "startup.s")
            .unwrap();
        let asm_command = asm["command"].as_str().unwrap();
        assert!(asm_command.contains("-DASM_ONLY"));
        assert!(!asm_command.contains("-DSTM32F10X_HD"));
        assert!(asm_command.contains("-D__ARM_COMPAT_H"));

        // missing files keep their database entry
        assert!(entries.iter().any(|e| e["file"] == "missing.c"));
    }

    #[test]
    fn test_second_generate_copies_nothing() {
        let (_root, project, doc) = fixture();
        let stub = project.join("stub");
        let snapshot = Snapshot::collect(&doc, &project, &stub, &Reporter::new()).unwrap();
        snapshot.generate(&Reporter::new()).unwrap();
        let reporter = Reporter::new();
        snapshot.generate(&reporter).unwrap();
        let tally = reporter.tally();
        assert_eq!(tally.copied, 0);
        assert_eq!(tally.failed, 0);
        assert_eq!(tally.up_to_date, snapshot.links().len());
    }

    #[test]
    fn test_sync_back_copies_only_newer_edits() {
        let (_root, project, doc) = fixture();
        let stub = project.join("stub");
        let snapshot = Snapshot::collect(&doc, &project, &stub, &Reporter::new()).unwrap();
        snapshot.generate(&Reporter::new()).unwrap();

        let edited = stub.join("src").join("main.c");
        fs::write(&edited, "int main(void) { return 1; }\n").unwrap();
        let file = fs::File::options().write(true).open(&edited).unwrap();
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(120);
        file.set_modified(later).unwrap();

        let reporter = Reporter::new();
        snapshot.sync_back(&reporter);
        assert_eq!(reporter.tally().copied, 1);
        assert_eq!(
            fs::read_to_string(project.join("src").join("main.c")).unwrap(),
            "int main(void) { return 1; }\n"
        );

        // the copy back leaves both sides identical
        let again = Reporter::new();
        snapshot.sync_back(&again);
        assert_eq!(again.tally().copied, 0);
    }

    #[test]
    fn test_sync_back_skips_missing_mirrors() {
        let (_root, project, doc) = fixture();
        let stub = project.join("stub");
        let snapshot = Snapshot::collect(&doc, &project, &stub, &Reporter::new()).unwrap();
        snapshot.generate(&Reporter::new()).unwrap();
        fs::remove_file(stub.join("startup.s")).unwrap();

        let reporter = Reporter::new();
        snapshot.sync_back(&reporter);
        assert_eq!(reporter.tally().failed, 0);
        assert!(project.join("startup.s").is_file());
    }
}
