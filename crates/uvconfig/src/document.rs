//! Document shell: parse, repair, mutate, query and write project files
//!
//! A [`Document`] owns one [`Project`] tree plus the warnings accumulated
//! while repairing it. Parsing is self-healing for schema drift and fatal
//! only for malformed XML or a wrong root tag. Mutations either apply
//! fully or leave the document unchanged.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::catalog::{File, Group, Groups, Project, Target, Targets};
use crate::error::ConfigError;
use crate::ident;
use crate::node::ConfigNode;
use crate::warn::{Warning, Warnings};
use crate::xml;

const ROOT_TAG: &str = "Project";

const ROOT_ATTRS: [(&str, &str); 2] = [
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsi:noNamespaceSchemaLocation", "project_projx.xsd"),
];

/// Reference to a target or group, by name or by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for NodeRef<'a> {
    fn from(name: &'a str) -> Self {
        NodeRef::Name(name)
    }
}

impl<'a> From<usize> for NodeRef<'a> {
    fn from(index: usize) -> Self {
        NodeRef::Index(index)
    }
}

/// Per-target list split by the tool it applies to. `common` entries
/// apply to every tool; compiler and assembler entries come from the
/// respective tool-option blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPartition {
    pub common: Vec<String>,
    pub compiler: Vec<String>,
    pub assembler: Vec<String>,
}

/// A parsed (or freshly built) uVision project document.
#[derive(Debug, Clone)]
pub struct Document {
    project: Project,
    warnings: Warnings,
}

impl Document {
    /// Default project skeleton with no targets.
    pub fn new() -> Self {
        Self {
            project: Project::new(),
            warnings: Warnings::new(),
        }
    }

    /// Parse document text. The root tag is checked before any child is
    /// touched; everything below the root is repaired rather than
    /// rejected, with one warning per repair.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let root = xml::parse(text)?;
        if root.tag != ROOT_TAG {
            return Err(ConfigError::MalformedDocument {
                expected: ROOT_TAG,
                found: root.tag,
            });
        }
        let mut warnings = Warnings::new();
        let mut project = Project::from_element(root, &mut warnings);
        project.link(true);
        Ok(Self { project, warnings })
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    /// Warnings recorded so far, oldest first.
    pub fn warnings(&self) -> &[Warning] {
        self.warnings.entries()
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.warnings.take()
    }

    /// Push every option map back into its leaf elements.
    pub fn sync(&mut self) {
        self.project.sync_options(true, &mut self.warnings);
    }

    /// Serialize the current state. Always renders through the tree, so
    /// the output is normalized regardless of what was parsed.
    pub fn to_xml(&mut self) -> String {
        self.sync();
        let mut root = self.project.to_element();
        for (name, value) in ROOT_ATTRS {
            root.set_attr(name, value);
        }
        xml::write_document(&root)
    }

    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = self.to_xml();
        fs::write(path, text)?;
        Ok(())
    }

    /// Append a default target named `name`.
    pub fn add_target(&mut self, name: &str) -> Result<(), ConfigError> {
        ident::check_identifier(name)?;
        if self.project.targets().position_by_name(name).is_some() {
            return Err(ConfigError::DuplicateName {
                kind: "target",
                name: name.to_string(),
            });
        }
        self.project.targets_mut().push(Target::named(name));
        Ok(())
    }

    /// Append a group under `target`. A target referenced by a name not
    /// yet present is created on the way.
    pub fn add_group<'a>(
        &mut self,
        target: impl Into<NodeRef<'a>>,
        name: &str,
    ) -> Result<(), ConfigError> {
        ident::check_identifier(name)?;
        let target = ensure_target(self.project.targets_mut(), target.into())?;
        if target.groups().position_by_name(name).is_some() {
            return Err(ConfigError::DuplicateName {
                kind: "group",
                name: name.to_string(),
            });
        }
        target.groups_mut().push(Group::named(name));
        Ok(())
    }

    /// Append a source file under `target`/`group`, deriving its type
    /// code and base name from the path. The path is stored exactly as
    /// given; only the duplicate check normalizes separators.
    pub fn add_file<'a, 'b>(
        &mut self,
        target: impl Into<NodeRef<'a>>,
        group: impl Into<NodeRef<'b>>,
        path: &str,
    ) -> Result<(), ConfigError> {
        if is_absolute_path(path) {
            return Err(ConfigError::AbsolutePath {
                path: PathBuf::from(path),
            });
        }
        let target = target.into();
        let group = group.into();
        // Ordinals never create. A group ordinal is resolved against the
        // current tree first, so a miss cannot leave a freshly created
        // target behind.
        if let NodeRef::Index(index) = group {
            let group_count = match target {
                NodeRef::Name(name) => self
                    .project
                    .targets()
                    .position_by_name(name)
                    .and_then(|at| self.project.targets().get(at))
                    .map_or(0, |t| t.groups().len()),
                NodeRef::Index(_) => find_target(self.project.targets(), target)?.groups().len(),
            };
            if index >= group_count {
                return Err(not_found("group", group));
            }
        }
        let target = ensure_target(self.project.targets_mut(), target)?;
        let group = ensure_group(target.groups_mut(), group)?;
        let key = compare_key(path);
        if group.files().iter().any(|f| compare_key(f.file_path()) == key) {
            return Err(ConfigError::DuplicateName {
                kind: "file",
                name: path.to_string(),
            });
        }
        group.files_mut().push(File::for_path(path));
        Ok(())
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.project.targets().iter().map(Target::name).collect()
    }

    /// Group names under `target`, in document order. Queries never
    /// create; an unknown reference is an error.
    pub fn group_names<'a>(
        &self,
        target: impl Into<NodeRef<'a>>,
    ) -> Result<Vec<&str>, ConfigError> {
        let target = find_target(self.project.targets(), target.into())?;
        Ok(target.groups().iter().map(Group::name).collect())
    }

    /// File paths under `target`/`group`, exactly as stored.
    pub fn file_paths<'a, 'b>(
        &self,
        target: impl Into<NodeRef<'a>>,
        group: impl Into<NodeRef<'b>>,
    ) -> Result<Vec<&str>, ConfigError> {
        let target = find_target(self.project.targets(), target.into())?;
        let group = find_group(target.groups(), group.into())?;
        Ok(group.files().iter().map(File::file_path).collect())
    }

    /// Include search paths for `target`. Common entries come from the
    /// target-wide option block; the tool entries from the respective
    /// `VariousControls`.
    pub fn include_paths<'a>(
        &self,
        target: impl Into<NodeRef<'a>>,
    ) -> Result<ToolPartition, ConfigError> {
        let target = find_target(self.project.targets(), target.into())?;
        let option = target.target_option();
        let arm_ads = option.arm_ads();
        Ok(ToolPartition {
            common: split_list(option.common_option().option("IncludePath").unwrap_or("")),
            compiler: split_list(
                arm_ads
                    .cads()
                    .various_controls()
                    .option("IncludePath")
                    .unwrap_or(""),
            ),
            assembler: split_list(
                arm_ads
                    .aads()
                    .various_controls()
                    .option("IncludePath")
                    .unwrap_or(""),
            ),
        })
    }

    /// Preprocessor defines for `target`. There is no target-wide define
    /// list, so `common` is always empty.
    pub fn defines<'a>(
        &self,
        target: impl Into<NodeRef<'a>>,
    ) -> Result<ToolPartition, ConfigError> {
        let target = find_target(self.project.targets(), target.into())?;
        let arm_ads = target.target_option().arm_ads();
        Ok(ToolPartition {
            common: Vec::new(),
            compiler: split_list(
                arm_ads
                    .cads()
                    .various_controls()
                    .option("Define")
                    .unwrap_or(""),
            ),
            assembler: split_list(
                arm_ads
                    .aads()
                    .various_controls()
                    .option("Define")
                    .unwrap_or(""),
            ),
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(kind: &'static str, node: NodeRef<'_>) -> ConfigError {
    let name = match node {
        NodeRef::Name(name) => name.to_string(),
        NodeRef::Index(index) => format!("#{index}"),
    };
    ConfigError::NotFound { kind, name }
}

fn find_target<'t>(targets: &'t Targets, node: NodeRef<'_>) -> Result<&'t Target, ConfigError> {
    let found = match node {
        NodeRef::Name(name) => targets.position_by_name(name).and_then(|p| targets.get(p)),
        NodeRef::Index(index) => targets.get(index),
    };
    found.ok_or_else(|| not_found("target", node))
}

fn find_group<'g>(groups: &'g Groups, node: NodeRef<'_>) -> Result<&'g Group, ConfigError> {
    let found = match node {
        NodeRef::Name(name) => groups.position_by_name(name).and_then(|p| groups.get(p)),
        NodeRef::Index(index) => groups.get(index),
    };
    found.ok_or_else(|| not_found("group", node))
}

/// Resolve `node`, creating a named target that does not exist yet.
/// Created names must be bare identifiers; looked-up names are keys and
/// stay unvalidated.
fn ensure_target<'t>(
    targets: &'t mut Targets,
    node: NodeRef<'_>,
) -> Result<&'t mut Target, ConfigError> {
    let index = match node {
        NodeRef::Name(name) => match targets.position_by_name(name) {
            Some(pos) => pos,
            None => {
                ident::check_identifier(name)?;
                targets.push(Target::named(name));
                targets.len() - 1
            }
        },
        NodeRef::Index(index) => {
            if index >= targets.len() {
                return Err(not_found("target", node));
            }
            index
        }
    };
    Ok(&mut targets[index])
}

fn ensure_group<'g>(
    groups: &'g mut Groups,
    node: NodeRef<'_>,
) -> Result<&'g mut Group, ConfigError> {
    let index = match node {
        NodeRef::Name(name) => match groups.position_by_name(name) {
            Some(pos) => pos,
            None => {
                ident::check_identifier(name)?;
                groups.push(Group::named(name));
                groups.len() - 1
            }
        },
        NodeRef::Index(index) => {
            if index >= groups.len() {
                return Err(not_found("group", node));
            }
            index
        }
    };
    Ok(&mut groups[index])
}

/// Split a uVision list option. Both separators appear in the wild;
/// blank entries from trailing separators are dropped.
fn split_list(text: &str) -> Vec<String> {
    text.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Paths are stored verbatim, so the duplicate check compares a
/// normalized form: forward slashes, no leading `./`.
fn compare_key(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let mut key = normalized.as_str();
    while let Some(rest) = key.strip_prefix("./") {
        key = rest;
    }
    key.to_string()
}

/// Paths in a project file are relative to the project directory.
/// Rejects Unix and Windows absolute forms regardless of host platform.
fn is_absolute_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warn::WarningKind;

    #[test]
    fn test_root_mismatch_is_fatal() {
        let err = Document::parse("<Target></Target>").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MalformedDocument { expected: "Project", .. }
        ));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        let err = doc.add_target("app").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName { kind: "target", .. }));
        assert_eq!(doc.target_names(), vec!["app"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.add_target("my target").unwrap_err(),
            ConfigError::InvalidIdentifier { .. }
        ));
        assert!(matches!(
            doc.add_group("app", "1st").unwrap_err(),
            ConfigError::InvalidIdentifier { .. }
        ));
        // Nothing was created on the failed calls.
        assert!(doc.target_names().is_empty());
    }

    #[test]
    fn test_add_group_creates_missing_target() {
        let mut doc = Document::new();
        doc.add_group("app", "Source").unwrap();
        assert_eq!(doc.target_names(), vec!["app"]);
        assert_eq!(doc.group_names("app").unwrap(), vec!["Source"]);
    }

    #[test]
    fn test_index_references() {
        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        doc.add_group(0usize, "Source").unwrap();
        doc.add_file(0usize, 0usize, "src/main.c").unwrap();

        assert_eq!(doc.file_paths("app", "Source").unwrap(), vec!["src/main.c"]);

        let err = doc.add_group(3usize, "Late").unwrap_err();
        match err {
            ConfigError::NotFound { kind, name } => {
                assert_eq!(kind, "target");
                assert_eq!(name, "#3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_group_ordinal_creates_no_target() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.add_file("fresh", 7usize, "src/a.c").unwrap_err(),
            ConfigError::NotFound { kind: "group", .. }
        ));
        assert!(doc.target_names().is_empty());

        doc.add_group("app", "Source").unwrap();
        assert!(matches!(
            doc.add_file("app", 1usize, "src/a.c").unwrap_err(),
            ConfigError::NotFound { kind: "group", .. }
        ));
        assert_eq!(doc.group_names("app").unwrap(), vec!["Source"]);
        assert!(doc.file_paths("app", "Source").unwrap().is_empty());

        // A target ordinal out of range reports the target itself.
        assert!(matches!(
            doc.add_file(4usize, 0usize, "src/a.c").unwrap_err(),
            ConfigError::NotFound { kind: "target", .. }
        ));
    }

    #[test]
    fn test_queries_never_create() {
        let doc = Document::new();
        assert!(matches!(
            doc.group_names("ghost").unwrap_err(),
            ConfigError::NotFound { kind: "target", .. }
        ));
        assert!(doc.target_names().is_empty());
    }

    #[test]
    fn test_file_classification_and_storage() {
        let mut doc = Document::new();
        doc.add_file("app", "Source", "src/main.c").unwrap();
        doc.add_file("app", "Source", "src\\startup.s").unwrap();
        doc.add_file("app", "Source", "notes.xyz").unwrap();

        let target = doc.project().targets().get(0).unwrap();
        let group = target.groups().get(0).unwrap();
        let files: Vec<(&str, &str, &str)> = group
            .files()
            .iter()
            .map(|f| (f.file_name(), f.file_type(), f.file_path()))
            .collect();
        assert_eq!(
            files,
            vec![
                ("main.c", "1", "src/main.c"),
                ("startup.s", "2", "src\\startup.s"),
                ("notes.xyz", "5", "notes.xyz"),
            ]
        );
    }

    #[test]
    fn test_absolute_paths_rejected() {
        let mut doc = Document::new();
        for path in ["/opt/lib/core.c", "\\network\\share.c", "C:\\src\\main.c"] {
            assert!(matches!(
                doc.add_file("app", "Source", path).unwrap_err(),
                ConfigError::AbsolutePath { .. }
            ));
        }
        assert!(doc.target_names().is_empty());
    }

    #[test]
    fn test_duplicate_file_separator_insensitive() {
        let mut doc = Document::new();
        doc.add_file("app", "Source", "src/main.c").unwrap();
        for dup in ["src\\main.c", "./src/main.c", ".\\src\\main.c"] {
            assert!(matches!(
                doc.add_file("app", "Source", dup).unwrap_err(),
                ConfigError::DuplicateName { kind: "file", .. }
            ));
        }
        assert_eq!(doc.file_paths("app", "Source").unwrap().len(), 1);
    }

    #[test]
    fn test_include_and_define_partition() {
        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        let target = doc.project_mut().targets_mut().get_mut(0).unwrap();
        target
            .target_option_mut()
            .common_option_mut()
            .set_option("IncludePath", "Lib/CMSIS/Core;Lib/SPL/inc");
        let arm_ads = target.target_option_mut().arm_ads_mut();
        arm_ads
            .cads_mut()
            .various_controls_mut()
            .set_option("IncludePath", "src, src/drivers;");
        arm_ads
            .cads_mut()
            .various_controls_mut()
            .set_option("Define", "STM32F10X_HD,USE_STDPERIPH_DRIVER");
        arm_ads
            .aads_mut()
            .various_controls_mut()
            .set_option("Define", "ASM_ONLY");

        let includes = doc.include_paths("app").unwrap();
        assert_eq!(includes.common, vec!["Lib/CMSIS/Core", "Lib/SPL/inc"]);
        assert_eq!(includes.compiler, vec!["src", "src/drivers"]);
        assert!(includes.assembler.is_empty());

        let defines = doc.defines("app").unwrap();
        assert!(defines.common.is_empty());
        assert_eq!(defines.compiler, vec!["STM32F10X_HD", "USE_STDPERIPH_DRIVER"]);
        assert_eq!(defines.assembler, vec!["ASM_ONLY"]);
    }

    #[test]
    fn test_to_xml_round_trip() {
        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        doc.add_group("app", "Source").unwrap();
        doc.add_file("app", "Source", "src/main.c").unwrap();

        let text = doc.to_xml();
        assert!(text.starts_with(xml::XML_DECLARATION));
        assert!(text.contains("xsi:noNamespaceSchemaLocation=\"project_projx.xsd\""));

        let reparsed = Document::parse(&text).unwrap();
        assert!(reparsed.warnings().is_empty());
        assert_eq!(reparsed.target_names(), vec!["app"]);
        assert_eq!(reparsed.file_paths("app", "Source").unwrap(), vec!["src/main.c"]);
        assert_eq!(
            reparsed
                .project()
                .targets()
                .get(0)
                .unwrap()
                .option("ToolsetName"),
            Some("ARM_ADS")
        );
    }

    #[test]
    fn test_sync_after_raw_option_edit() {
        let mut doc = Document::new();
        doc.add_target("app").unwrap();
        let target = doc.project_mut().targets_mut().get_mut(0).unwrap();
        target.set_option("ToolsetName", "TEST_ADS");

        let text = doc.to_xml();
        assert!(text.contains("<ToolsetName>TEST_ADS</ToolsetName>"));
        assert_eq!(doc.warnings().iter().filter(|w| w.kind == WarningKind::CreatedOnSync).count(), 0);
    }
}
