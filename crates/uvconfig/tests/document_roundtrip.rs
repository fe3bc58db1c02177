//! Round-trip tests for mutation-built documents
//!
//! A document built purely through the mutation API must serialize to a
//! complete project file and survive parse → serialize unchanged.

use uvconfig::{ConfigNode, Document};

/// Two targets, two groups, a few files, plus tool options set through
/// the typed accessors.
fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.add_target("debug").unwrap();
    doc.add_group("debug", "Source").unwrap();
    doc.add_file("debug", "Source", "src/main.c").unwrap();
    doc.add_file("debug", "Source", "src/stm32f10x_it.c").unwrap();
    doc.add_group("debug", "Startup").unwrap();
    doc.add_file("debug", "Startup", "Lib\\CMSIS\\DFP\\startup_stm32f10x_hd.s")
        .unwrap();
    doc.add_target("release").unwrap();
    doc.add_file("release", "Source", "src/main.c").unwrap();

    let target = doc.project_mut().targets_mut().get_mut(0).unwrap();
    target
        .target_option_mut()
        .common_option_mut()
        .set_option("IncludePath", "Lib/CMSIS/Core;Lib/SPL/inc");
    let controls = target
        .target_option_mut()
        .arm_ads_mut()
        .cads_mut()
        .various_controls_mut();
    controls.set_option("IncludePath", "src;src/drivers");
    controls.set_option("Define", "STM32F10X_HD,USE_STDPERIPH_DRIVER");
    doc
}

#[test]
fn test_fresh_document_serializes_complete_skeleton() {
    let text = Document::new().to_xml();

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>"));
    assert!(text.contains("<Project xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    assert!(text.contains("xsi:noNamespaceSchemaLocation=\"project_projx.xsd\""));
    assert!(text.contains("<SchemaVersion>2.1</SchemaVersion>"));
    assert!(text.contains("<Header>### uVision Project, (C) Keil Software</Header>"));
    assert!(text.contains("<Targets></Targets>"));
    assert!(text.contains("<apis></apis>"));
    assert!(text.contains("<Layers></Layers>"));
    // Explicit closing tags throughout, never the self-closing form.
    assert!(!text.contains("/>"));
}

#[test]
fn test_root_children_render_in_catalog_order() {
    let mut doc = sample_document();
    let root = uvconfig::xml::parse(&doc.to_xml()).unwrap();

    let tags: Vec<&str> = root.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["SchemaVersion", "Header", "Targets", "RTE", "LayerInfo"]
    );
}

#[test]
fn test_new_target_carries_full_default_tree() {
    let mut doc = Document::new();
    doc.add_target("app").unwrap();
    let text = doc.to_xml();

    // Spot checks across the depth of the tree.
    assert!(text.contains("<TargetName>app</TargetName>"));
    assert!(text.contains("<OutputName>app</OutputName>"));
    assert!(text.contains("<ToolsetName>ARM_ADS</ToolsetName>"));
    assert!(text.contains("<Device>STM32F103ZE</Device>"));
    assert!(text.contains("<SimDllName>SARMCM3.DLL</SimDllName>"));
    assert!(text.contains("<AdsCpuType>\"Cortex-M3\"</AdsCpuType>"));
    assert!(text.contains("<OCR_RVCT10>"));
    assert!(text.contains("<LDads>"));
}

#[test]
fn test_parse_of_serialized_document_is_quiet() {
    let mut doc = sample_document();
    let reparsed = Document::parse(&doc.to_xml()).unwrap();
    assert!(
        reparsed.warnings().is_empty(),
        "unexpected warnings: {:?}",
        reparsed.warnings()
    );
}

#[test]
fn test_round_trip_preserves_structure_and_options() {
    let mut doc = sample_document();
    let reparsed = Document::parse(&doc.to_xml()).unwrap();

    assert_eq!(reparsed.target_names(), vec!["debug", "release"]);
    assert_eq!(
        reparsed.group_names("debug").unwrap(),
        vec!["Source", "Startup"]
    );
    assert_eq!(
        reparsed.file_paths("debug", "Source").unwrap(),
        vec!["src/main.c", "src/stm32f10x_it.c"]
    );
    assert_eq!(
        reparsed.file_paths("debug", "Startup").unwrap(),
        vec!["Lib\\CMSIS\\DFP\\startup_stm32f10x_hd.s"]
    );

    let includes = reparsed.include_paths("debug").unwrap();
    assert_eq!(includes.common, vec!["Lib/CMSIS/Core", "Lib/SPL/inc"]);
    assert_eq!(includes.compiler, vec!["src", "src/drivers"]);
    assert!(includes.assembler.is_empty());

    let defines = reparsed.defines("debug").unwrap();
    assert_eq!(
        defines.compiler,
        vec!["STM32F10X_HD", "USE_STDPERIPH_DRIVER"]
    );
}

#[test]
fn test_serialization_is_stable_across_round_trips() {
    let mut doc = sample_document();
    let first = doc.to_xml();
    let mut reparsed = Document::parse(&first).unwrap();
    let second = reparsed.to_xml();
    assert_eq!(first, second);
}

#[test]
fn test_escaped_characters_round_trip() {
    let mut doc = Document::new();
    doc.add_file("app", "Source", "src/a&b.c").unwrap();

    let text = doc.to_xml();
    assert!(text.contains("<FilePath>src/a&amp;b.c</FilePath>"));

    let reparsed = Document::parse(&text).unwrap();
    assert_eq!(reparsed.file_paths("app", "Source").unwrap(), vec!["src/a&b.c"]);
}

#[test]
fn test_write_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blinky.uvprojx");

    let mut doc = sample_document();
    doc.write(&path).unwrap();

    let reloaded = Document::load_file(&path).unwrap();
    assert!(reloaded.warnings().is_empty());
    assert_eq!(reloaded.target_names(), vec!["debug", "release"]);

    let missing = Document::load_file(dir.path().join("absent.uvprojx"));
    assert!(missing.is_err());
}

#[test]
fn test_deep_option_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.uvprojx");

    let mut doc = Document::new();
    doc.add_target("app").unwrap();
    doc.project_mut()
        .targets_mut()
        .get_mut(0)
        .unwrap()
        .target_option_mut()
        .arm_ads_mut()
        .misc_mut()
        .on_chip_memories_mut()
        .memory_mut("IROM")
        .unwrap()
        .set_option("Size", "0x80000");
    doc.write(&path).unwrap();

    let reloaded = Document::load_file(&path).unwrap();
    let target = reloaded.project().targets().get(0).unwrap();
    let irom = target
        .target_option()
        .arm_ads()
        .misc()
        .on_chip_memories()
        .memory("IROM")
        .unwrap();
    assert_eq!(irom.option("Size"), Some("0x80000"));
}
