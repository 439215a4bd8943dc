use std::collections::BTreeMap;

/// Active filter set: API parameter name -> value.
///
/// Keys are forwarded to the search API verbatim, so anything the endpoint
/// understands (`colors`, `min_width`, ...) can be carried, not only the
/// sections offered by the filter modal.
pub type Filters = BTreeMap<String, String>;

/// One selectable group in the filter modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSection {
    pub key: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

pub const FILTER_SECTIONS: &[FilterSection] = &[
    FilterSection {
        key: "order",
        label: "Order",
        options: &["popular", "latest"],
    },
    FilterSection {
        key: "orientation",
        label: "Orientation",
        options: &["horizontal", "vertical"],
    },
    FilterSection {
        key: "image_type",
        label: "Type",
        options: &["photo", "illustration", "vector"],
    },
    FilterSection {
        key: "colors",
        label: "Colors",
        options: &[
            "red",
            "orange",
            "yellow",
            "green",
            "turquoise",
            "blue",
            "pink",
            "gray",
            "black",
            "brown",
            "white",
        ],
    },
];

/// Look up the modal section for a filter key.
pub fn section_for(key: &str) -> Option<&'static FilterSection> {
    FILTER_SECTIONS.iter().find(|section| section.key == key)
}

/// Select `option` in `section`, or deselect it when it is already active.
pub fn toggle(filters: &mut Filters, section: &FilterSection, option: &str) {
    match filters.get(section.key) {
        Some(current) if current == option => {
            filters.remove(section.key);
        }
        _ => {
            filters.insert(section.key.to_string(), option.to_string());
        }
    }
}
