//! Pack staging
//!
//! Bootstraps a uVision project with the vendored sources it builds
//! against: the ST standard peripheral library, the CMSIS core headers
//! and the device family pack startup files, laid out under `Lib/` the
//! way the stock project expects them. Copies are checksum-guarded so a
//! re-run after a pack update only rewrites changed files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use thiserror::Error;

use crate::fsops;
use crate::locate::{self, LocateError};
use crate::pool;
use crate::report::Reporter;

const STM32F10X_CONF: &str = include_str!("assets/stm32f10x_conf.h");

#[derive(Debug, Error)]
pub enum StrapError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("no standard peripheral library at {}", .0.display())]
    SplNotFound(PathBuf),
    #[error("no device family pack under {}", .0.display())]
    DfpNotFound(PathBuf),
    #[error("no CMSIS core distribution under {}", .0.display())]
    CmsisNotFound(PathBuf),
    #[error("required pack file missing: {}", .0.display())]
    PackFileMissing(PathBuf),
    #[error("no default configuration header for device {0}")]
    NoConfHeader(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Inputs for one staging run.
#[derive(Debug, Clone)]
pub struct StrapOptions {
    pub st_software_dir: PathBuf,
    pub keil_pack_dir: PathBuf,
    pub project_dir: PathBuf,
    pub dfp_name: String,
    pub spl_name: String,
    /// Remove everything under `Lib/` before staging.
    pub clean: bool,
    /// Rewrite `NVIC->IP` accesses in the staged SPL for armclang.
    pub amend_spl: bool,
}

/// Device name used in generated file names, taken from the leading
/// segment of the SPL directory name ("STM32F10x_StdPeriph_Driver"
/// yields "stm32f10x").
pub fn device_name(spl_name: &str) -> String {
    let head = spl_name.split_once('_').map_or(spl_name, |(head, _)| head);
    head.to_ascii_lowercase()
}

/// Stages SPL, CMSIS core and device family pack files into the project.
///
/// Progress and per-file outcomes go to `reporter`; the caller reads the
/// final tally from it.
pub fn bootstrap(opts: &StrapOptions, reporter: &Reporter) -> Result<(), StrapError> {
    let device = device_name(&opts.spl_name);
    locate::find_project_file(&opts.project_dir)?;

    let lib_dest = opts.project_dir.join("Lib");
    if opts.clean {
        remove_staged(&lib_dest, reporter)?;
    }

    reporter.note("finding spl");
    let spl_base = opts.st_software_dir.join("Libraries").join(&opts.spl_name);
    reporter.note(&format!("spl dir: {}", spl_base.display()));
    if !spl_base.is_dir() {
        return Err(StrapError::SplNotFound(spl_base));
    }
    let spl_sources = files_with_ext(&spl_base.join("src"), "c")?;
    let spl_headers = files_with_ext(&spl_base.join("inc"), "h")?;

    reporter.note("finding device family pack");
    let dfp_root = opts.keil_pack_dir.join("Keil").join(&opts.dfp_name);
    let dfp_base = versioned_pack_dir(&dfp_root, "Device")?
        .ok_or_else(|| StrapError::DfpNotFound(dfp_root.clone()))?;
    reporter.note(&format!("device family pack: {}", dfp_base.display()));
    let dfp_headers = files_with_ext(&dfp_base.join("Include"), "h")?;
    let system_src = dfp_base.join("Source").join(format!("system_{device}.c"));
    require_file(&system_src)?;
    let startup_src = dfp_base
        .join("Source")
        .join("ARM")
        .join(format!("startup_{device}_hd.s"));
    require_file(&startup_src)?;

    reporter.note("finding cmsis core");
    let cmsis_root = opts.keil_pack_dir.join("ARM").join("CMSIS");
    let cmsis_base = versioned_pack_dir(&cmsis_root, "CMSIS")?
        .ok_or_else(|| StrapError::CmsisNotFound(cmsis_root.clone()))?;
    reporter.note(&format!("cmsis core: {}", cmsis_base.display()));
    let core_include = cmsis_base.join("Core").join("Include");
    let mut core_headers = files_with_ext(&core_include, "h")?;
    core_headers.extend(files_with_ext(&core_include.join("a-profile"), "h")?);
    let core_m_headers = files_with_ext(&core_include.join("m-profile"), "h")?;
    let core_sources = files_with_ext(&cmsis_base.join("Core").join("Source"), "c")?;

    reporter.note("bootstrapping");
    let spl_dest = lib_dest.join("SPL");
    let core_dest = lib_dest.join("CMSIS").join("Core");
    let core_m_dest = core_dest.join("m-profile");
    let dfp_dest = lib_dest.join("CMSIS").join("DFP");

    let mut jobs = Vec::new();
    queue_into(&mut jobs, spl_sources, &spl_dest);
    queue_into(&mut jobs, spl_headers, &spl_dest);
    queue_into(&mut jobs, dfp_headers, &dfp_dest);
    queue_into(&mut jobs, core_headers, &core_dest);
    queue_into(&mut jobs, core_m_headers, &core_m_dest);
    queue_into(&mut jobs, core_sources, &core_dest);
    queue_into(&mut jobs, vec![system_src, startup_src], &dfp_dest);
    pool::for_each_parallel(jobs, pool::DEFAULT_WORKERS, |(src, dst)| {
        fsops::copy_reporting(&src, &dst, reporter);
    });

    if opts.amend_spl {
        amend_interrupt_priority(&spl_dest.join("misc.c"), reporter)?;
    }

    write_default_headers(&opts.project_dir, &device, reporter)?;
    Ok(())
}

fn remove_staged(lib_dest: &Path, reporter: &Reporter) -> Result<(), StrapError> {
    match fs::remove_dir_all(lib_dest) {
        Ok(()) => {
            reporter.note(&format!("removed {}", lib_dest.display()));
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Files directly under `dir` with the given extension, sorted. A
/// missing directory yields an empty list since optional pack subtrees
/// like `a-profile/` are not present in every release.
fn files_with_ext(dir: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return Ok(out);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Resolves `root/<version>/<child>`, picking the lexically first
/// version directory that carries the expected child.
fn versioned_pack_dir(root: &Path, child: &str) -> io::Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    if !root.is_dir() {
        return Ok(None);
    }
    for entry in fs::read_dir(root)? {
        let candidate = entry?.path().join(child);
        if candidate.is_dir() {
            candidates.push(candidate);
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

fn require_file(path: &Path) -> Result<(), StrapError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StrapError::PackFileMissing(path.to_path_buf()))
    }
}

fn queue_into(jobs: &mut Vec<(PathBuf, PathBuf)>, sources: Vec<PathBuf>, dest: &Path) {
    for src in sources {
        if let Some(name) = src.file_name() {
            let dst = dest.join(name);
            jobs.push((src, dst));
        }
    }
}

/// armclang's CMSIS headers renamed `NVIC_Type.IP` to `IPR` and the F1
/// SPL still uses the old field in `misc.c`. The trailing word boundary
/// keeps the rewrite idempotent.
fn amend_interrupt_priority(path: &Path, reporter: &Reporter) -> Result<(), StrapError> {
    if !path.is_file() {
        reporter.skipped(&format!("nothing to amend at {}", path.display()));
        return Ok(());
    }
    let text = fs::read_to_string(path)?;
    let pattern = Regex::new(r"NVIC\s*->\s*IP\b").unwrap();
    let amended = pattern.replace_all(&text, "NVIC->IPR");
    if amended != text {
        fs::write(path, amended.as_bytes())?;
        reporter.note(&format!("amended {}", path.display()));
    }
    Ok(())
}

/// Writes `src/<device>_conf.h` and `src/RTE_Components.h` when the
/// project does not carry them yet. Existing files are never touched.
fn write_default_headers(
    project_dir: &Path,
    device: &str,
    reporter: &Reporter,
) -> Result<(), StrapError> {
    let src_dir = project_dir.join("src");
    let conf = src_dir.join(format!("{device}_conf.h"));
    if !conf.is_file() {
        reporter.skipped(&format!("no {}, writing the default", conf.display()));
        let body = default_conf_header(device)
            .ok_or_else(|| StrapError::NoConfHeader(device.to_string()))?;
        fs::create_dir_all(&src_dir)?;
        fs::write(&conf, body)?;
    }
    let rte = src_dir.join("RTE_Components.h");
    if !rte.is_file() {
        reporter.skipped(&format!("no {}, writing the default", rte.display()));
        fs::create_dir_all(&src_dir)?;
        fs::write(&rte, rte_components_header(device))?;
    }
    Ok(())
}

fn default_conf_header(device: &str) -> Option<&'static str> {
    match device {
        "stm32f10x" => Some(STM32F10X_CONF),
        _ => None,
    }
}

fn rte_components_header(device: &str) -> String {
    format!(
        "#ifndef RTE_COMPONENTS_H\n\
         #define RTE_COMPONENTS_H\n\
         #define CMSIS_device_header \"{device}.h\"\n\
         #endif\n"
    )
}
