use std::sync::OnceLock;

use regex::Regex;

use crate::error::SegmentationError;
use crate::types::InsertionPlan;

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]\s*>{5,}").expect("static marker regex"))
}

/// Same marker including the blank lines around it, as spliced by [`apply`].
fn marker_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\n\[\d+\] >{5,}\n\n").expect("static marker block regex"))
}

/// Splices every planned marker into `chapter`, highest offset first so the
/// remaining offsets stay valid against the original text.
pub fn apply(chapter: &str, plan: &InsertionPlan) -> Result<String, SegmentationError> {
    let extra: usize = plan.entries().iter().map(|e| e.marker_text.len()).sum();
    let mut annotated = String::with_capacity(chapter.len() + extra);
    annotated.push_str(chapter);

    for entry in plan.entries().iter().rev() {
        if entry.position > chapter.len() || !chapter.is_char_boundary(entry.position) {
            return Err(SegmentationError::MarkerOffset {
                ordinal: entry.ordinal,
                position: entry.position,
                chapter_len: chapter.len(),
            });
        }
        annotated.insert_str(entry.position, &entry.marker_text);
    }
    Ok(annotated)
}

/// Removes marker blocks inserted by [`apply`], restoring the chapter text.
pub fn strip_markers(annotated: &str) -> String {
    marker_block_re().replace_all(annotated, "").into_owned()
}

/// Text between markers, trimmed; empty blocks are dropped. Text before the
/// first marker counts as a block.
pub fn split_marker_blocks(annotated: &str) -> Vec<String> {
    marker_re()
        .split(annotated)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerStyle;
    use crate::types::PlannedMarker;

    fn plan(positions: &[(usize, usize)]) -> InsertionPlan {
        let style = MarkerStyle::default();
        let mut plan = InsertionPlan::new();
        for &(ordinal, position) in positions {
            plan.push(PlannedMarker {
                ordinal,
                position,
                marker_text: style.render(ordinal),
            })
            .unwrap();
        }
        plan
    }

    #[test]
    fn empty_plan_leaves_text_unchanged() {
        let text = "Ala ma kota.";
        assert_eq!(apply(text, &InsertionPlan::new()).unwrap(), text);
    }

    #[test]
    fn inserts_in_original_coordinates() {
        let text = "— Raz.\n— Dwa.";
        let second = text.rfind('—').unwrap();
        let annotated = apply(text, &plan(&[(1, 0), (2, second)])).unwrap();
        assert_eq!(
            annotated,
            "\n\n[1] >>>>>>>>>>>>\n\n— Raz.\n\n\n[2] >>>>>>>>>>>>\n\n— Dwa."
        );
    }

    #[test]
    fn marker_at_text_end_is_allowed() {
        let text = "koniec";
        let annotated = apply(text, &plan(&[(1, text.len())])).unwrap();
        assert!(annotated.ends_with("[1] >>>>>>>>>>>>\n\n"));
    }

    #[test]
    fn rejects_position_inside_a_char() {
        let text = "źdźbło";
        assert!(matches!(
            apply(text, &plan(&[(1, 1)])),
            Err(SegmentationError::MarkerOffset { position: 1, .. })
        ));
        assert!(apply(text, &plan(&[(1, 99)])).is_err());
    }

    #[test]
    fn strip_restores_original() {
        let text = "Szli długo.\n\n— Daleko jeszcze? — spytała Nel.\n\nNikt nie odpowiedział.";
        let positions = [
            (1, 0),
            (2, text.find('—').unwrap()),
            (3, text.find("Nikt").unwrap()),
        ];
        let annotated = apply(text, &plan(&positions)).unwrap();
        assert_eq!(strip_markers(&annotated), text);
    }

    #[test]
    fn strip_handles_padded_ordinals() {
        let style = MarkerStyle { pad_width: 3 };
        let text = format!("Ala{}ma kota", style.render(12));
        assert_eq!(strip_markers(&text), "Alama kota");
    }

    #[test]
    fn split_blocks_trims_and_drops_empty() {
        let annotated = "\n\n[1] >>>>>>>>>>>>\n\n— Raz.\n\n\n[2] >>>>>>>>>>>>\n\n\n\n[3] >>>>>>>>>>>>\n\n Trzy ";
        assert_eq!(split_marker_blocks(annotated), vec!["— Raz.", "Trzy"]);
    }

    #[test]
    fn split_blocks_keeps_text_before_first_marker() {
        let annotated = "Tytuł\n\n[1] >>>>>>>>>>>>\n\nTreść";
        assert_eq!(split_marker_blocks(annotated), vec!["Tytuł", "Treść"]);
    }
}
