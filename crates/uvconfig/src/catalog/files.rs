//! Source tree nodes: groups, file lists and file-type classification

use crate::node::{adopt_child, adopt_children, ConfigNode, NodeCore};
use crate::schema::{opt, Schema};
use crate::warn::Warnings;
use crate::xml::Element;

/// uVision file categories, stored in `<FileType>` as a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    CSource,
    Assembly,
    Object,
    Library,
    CppSource,
    /// Anything unrecognized; uVision shows these but never builds them.
    Text,
}

impl FileKind {
    /// Classify by extension, case-insensitive. Unknown extensions and
    /// extensionless names are plain text.
    pub fn from_path(path: &str) -> Self {
        let name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(path);
        let ext = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return FileKind::Text,
        };
        match ext.as_str() {
            "c" => FileKind::CSource,
            "s" | "asm" => FileKind::Assembly,
            "o" | "obj" => FileKind::Object,
            "lib" | "a" => FileKind::Library,
            "cpp" | "cc" | "cxx" => FileKind::CppSource,
            _ => FileKind::Text,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FileKind::CSource => "1",
            FileKind::Assembly => "2",
            FileKind::Object => "3",
            FileKind::Library => "4",
            FileKind::Text => "5",
            FileKind::CppSource => "8",
        }
    }
}

static FILE_SCHEMA: Schema = Schema {
    options: &[
        opt("FileName", ""),
        opt("FileType", ""),
        opt("FilePath", ""),
    ],
    children: &[],
};

/// One project file entry. Paths are stored verbatim, the way the
/// project file records them.
#[derive(Debug, Clone)]
pub struct File {
    core: NodeCore,
}

impl File {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("File", &FILE_SCHEMA),
        }
    }

    /// Build an entry for `path`: base name, classified type, verbatim path.
    pub fn for_path(path: &str) -> Self {
        let mut file = Self::new();
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        file.set_option("FileName", name);
        file.set_option("FileType", FileKind::from_path(path).code());
        file.set_option("FilePath", path);
        file
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("File", el);
        core.load(&FILE_SCHEMA, warnings);
        Self { core }
    }

    pub fn file_name(&self) -> &str {
        self.core.options().get("FileName").unwrap_or("")
    }

    pub fn file_type(&self) -> &str {
        self.core.options().get("FileType").unwrap_or("")
    }

    pub fn file_path(&self) -> &str {
        self.core.options().get("FilePath").unwrap_or("")
    }
}

impl Default for File {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for File {
    fn schema(&self) -> &'static Schema {
        &FILE_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        Vec::new()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        Vec::new()
    }
}

static FILES_SCHEMA: Schema = Schema {
    options: &[],
    children: &["File"],
};

/// The `<Files>` list inside one group.
#[derive(Debug, Clone)]
pub struct Files {
    core: NodeCore,
    files: Vec<File>,
}

impl Files {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Files", &FILES_SCHEMA),
            files: Vec::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Files", el);
        core.load(&FILES_SCHEMA, warnings);
        let files = adopt_children(&mut core, 0, "File", warnings, File::from_element);
        Self { core, files }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, File> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn push(&mut self, file: File) {
        let index = self.files.len();
        self.files.push(file);
        self.core.attach_sub(index);
    }
}

impl Default for Files {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Files {
    fn schema(&self) -> &'static Schema {
        &FILES_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        self.files.iter().map(|f| f as &dyn ConfigNode).collect()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        self.files
            .iter_mut()
            .map(|f| f as &mut dyn ConfigNode)
            .collect()
    }
}

static GROUP_SCHEMA: Schema = Schema {
    options: &[opt("GroupName", "")],
    children: &["Files"],
};

/// A named source group.
#[derive(Debug, Clone)]
pub struct Group {
    core: NodeCore,
    files: Files,
}

impl Group {
    pub fn new() -> Self {
        let mut core = NodeCore::with_defaults("Group", &GROUP_SCHEMA);
        core.attach_sub(0);
        Self {
            core,
            files: Files::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        let mut group = Self::new();
        group.set_option("GroupName", name);
        group
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Group", el);
        core.load(&GROUP_SCHEMA, warnings);
        let files = adopt_child(&mut core, 0, "Files", warnings, Files::from_element);
        Self { core, files }
    }

    pub fn name(&self) -> &str {
        self.core.options().get("GroupName").unwrap_or("")
    }

    pub fn files(&self) -> &Files {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut Files {
        &mut self.files
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode for Group {
    fn schema(&self) -> &'static Schema {
        &GROUP_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        vec![&self.files]
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        vec![&mut self.files]
    }
}

static GROUPS_SCHEMA: Schema = Schema {
    options: &[],
    children: &["Group"],
};

/// All groups of one target, in declaration order.
#[derive(Debug, Clone)]
pub struct Groups {
    core: NodeCore,
    groups: Vec<Group>,
}

impl Groups {
    pub fn new() -> Self {
        Self {
            core: NodeCore::with_defaults("Groups", &GROUPS_SCHEMA),
            groups: Vec::new(),
        }
    }

    pub(crate) fn from_element(el: Element, warnings: &mut Warnings) -> Self {
        let mut core = NodeCore::from_element("Groups", el);
        core.load(&GROUPS_SCHEMA, warnings);
        let groups = adopt_children(&mut core, 0, "Group", warnings, Group::from_element);
        Self { core, groups }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Group> {
        self.groups.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Group> {
        self.groups.get_mut(index)
    }

    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name() == name)
    }

    pub fn push(&mut self, group: Group) {
        let index = self.groups.len();
        self.groups.push(group);
        self.core.attach_sub(index);
    }
}

impl Default for Groups {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for Groups {
    type Output = Group;
    fn index(&self, index: usize) -> &Group {
        &self.groups[index]
    }
}

impl std::ops::IndexMut<usize> for Groups {
    fn index_mut(&mut self, index: usize) -> &mut Group {
        &mut self.groups[index]
    }
}

impl ConfigNode for Groups {
    fn schema(&self) -> &'static Schema {
        &GROUPS_SCHEMA
    }
    fn core(&self) -> &NodeCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
    fn subconfigs(&self) -> Vec<&dyn ConfigNode> {
        self.groups.iter().map(|g| g as &dyn ConfigNode).collect()
    }
    fn subconfigs_mut(&mut self) -> Vec<&mut dyn ConfigNode> {
        self.groups
            .iter_mut()
            .map(|g| g as &mut dyn ConfigNode)
            .collect()
    }
}
