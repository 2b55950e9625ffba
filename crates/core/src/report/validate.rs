use super::types::{Report, SideStatus};
use crate::plate::{output_filename, Finish, SideSpec};
use std::path::Path;

/// Cross-checks the finished report against the files on disk.
///
/// Every finish a successful side declared must have a corresponding
/// entry in `outputs` and a file in the results directory. The albedo
/// and die channels are exempt: albedo depends on process ink coverage
/// and the die channels are validated by their own extraction path.
pub fn validate_report(report: &Report, results_dir: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    for side in &report.sides {
        if side.status != SideStatus::Ok {
            continue;
        }
        let spec = SideSpec {
            side: side.side,
            index: side.index,
            finishes: side.finishes.clone(),
            die: side.die,
        };
        for finish in spec.declared_finishes() {
            if matches!(
                finish,
                Finish::Albedo | Finish::DiecutMask | Finish::DiecutSvg
            ) {
                continue;
            }
            let filename = output_filename(side.side, side.index, finish);
            let stem = filename.trim_end_matches(&format!(".{}", finish.extension()));
            if !report.outputs.contains_key(stem) {
                warnings.push(format!(
                    "Declared finish '{}' on {} layer {} has no output",
                    finish, side.side, side.index
                ));
                continue;
            }
            if !results_dir.join(&filename).exists() {
                warnings.push(format!(
                    "Output '{}' listed in report but missing on disk",
                    filename
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::Side;
    use crate::report::{ReportBuilder, SideReport};
    use tempfile::TempDir;

    fn side(finishes: Vec<&str>, die: bool, status: SideStatus) -> SideReport {
        SideReport {
            side: Side::Front,
            index: 0,
            finishes: finishes.into_iter().map(String::from).collect(),
            die,
            status,
            error: None,
        }
    }

    #[test]
    fn test_complete_report_passes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("front_layer_0_foil.png"), b"png").unwrap();
        let mut builder = ReportBuilder::new("j1");
        builder.add_side(side(vec!["foil"], false, SideStatus::Ok));
        builder.add_output("front_layer_0_foil", "front_layer_0_foil.png");
        let warnings = validate_report(&builder.build(), dir.path());
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_missing_declared_finish_warns() {
        let dir = TempDir::new().unwrap();
        let mut builder = ReportBuilder::new("j1");
        builder.add_side(side(vec!["foil", "uv"], false, SideStatus::Ok));
        builder.add_output("front_layer_0_foil", "front_layer_0_foil.png");
        std::fs::write(dir.path().join("front_layer_0_foil.png"), b"png").unwrap();
        let warnings = validate_report(&builder.build(), dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("uv"));
    }

    #[test]
    fn test_listed_output_missing_on_disk_warns() {
        let dir = TempDir::new().unwrap();
        let mut builder = ReportBuilder::new("j1");
        builder.add_side(side(vec!["foil"], false, SideStatus::Ok));
        builder.add_output("front_layer_0_foil", "front_layer_0_foil.png");
        let warnings = validate_report(&builder.build(), dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("missing on disk"));
    }

    #[test]
    fn test_albedo_and_die_are_exempt() {
        let dir = TempDir::new().unwrap();
        let mut builder = ReportBuilder::new("j1");
        builder.add_side(side(vec!["albedo"], true, SideStatus::Ok));
        let warnings = validate_report(&builder.build(), dir.path());
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_failed_side_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut builder = ReportBuilder::new("j1");
        builder.add_side(side(vec!["foil"], false, SideStatus::Failed));
        let warnings = validate_report(&builder.build(), dir.path());
        assert!(warnings.is_empty());
    }
}
