//! DOM output for the HUD view
//!
//! Only looks elements up by id and writes text/classes; the page owns the
//! markup and styling.

use web_sys::{Document, Element};

use crate::hud::HudView;

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
}

fn set_hidden(document: &Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }
}

fn fill_list(document: &Document, list: &Element, items: &[String]) {
    list.set_text_content(None);
    for item in items {
        if let Ok(li) = document.create_element("li") {
            li.set_text_content(Some(item));
            let _ = list.append_child(&li);
        }
    }
}

/// Writes `HudView`s into the page, skipping unchanged frames
pub struct HudDom {
    document: Document,
    last: Option<HudView>,
}

impl HudDom {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self {
            document,
            last: None,
        })
    }

    pub fn update(&mut self, view: &HudView) {
        if self.last.as_ref() == Some(view) {
            return;
        }
        let doc = &self.document;

        set_text(doc, "hud-score", &view.score.to_string());
        set_text(doc, "hud-darts", &view.darts_text());
        set_text(doc, "hud-hover", &view.hover);
        set_text(doc, "hud-history", &view.recent.join("  ·  "));

        match view.fps {
            Some(fps) => {
                set_text(doc, "hud-fps", &fps.to_string());
                set_hidden(doc, "hud-fps", false);
            }
            None => set_hidden(doc, "hud-fps", true),
        }

        set_text(doc, "toast", view.toast.as_deref().unwrap_or(""));
        set_hidden(doc, "toast", view.toast.is_none());

        if let Some(summary) = &view.summary {
            set_text(doc, "summary-score", &summary.total_score.to_string());
            set_text(doc, "summary-throws", &summary.throws.to_string());
            set_text(doc, "summary-best", summary.best.as_deref().unwrap_or("-"));
            let rank = summary
                .rank_hint
                .map(|r| format!("#{r}"))
                .unwrap_or_default();
            set_text(doc, "summary-rank", &rank);
        }
        set_hidden(doc, "round-summary", view.summary.is_none());

        let rows_changed = self.last.as_ref().map(|l| &l.leaderboard) != Some(&view.leaderboard);
        if rows_changed {
            if let (Some(rows), Some(list)) =
                (&view.leaderboard, doc.get_element_by_id("leaderboard-list"))
            {
                let items: Vec<String> = rows
                    .iter()
                    .map(|r| format!("{}. {} - {}", r.rank, r.name, r.score))
                    .collect();
                fill_list(doc, &list, &items);
            }
        }
        set_hidden(doc, "leaderboard", view.leaderboard.is_none());

        if let Some(btn) = doc.get_element_by_id("throw-hint") {
            let _ = btn.class_list().toggle_with_force("disabled", !view.can_throw);
        }

        self.last = Some(view.clone());
    }
}
