pub const ARTIFACT_SUFFIX: &str = "_prey_hierarchy.json";

pub fn artifact_file_name(predator: &str) -> String {
    format!("{}{ARTIFACT_SUFFIX}", predator.trim().replace(' ', "_"))
}

/// Inverse of [`artifact_file_name`] for listing cached predators.
pub fn predator_from_file_name(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(ARTIFACT_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.replace('_', " "))
}

/// `"Red fox (Vulpes vulpes)"` -> `"Vulpes vulpes"`.
pub fn scientific_name(label: &str) -> &str {
    label
        .rsplit_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(label.trim())
}

/// `"Red fox (Vulpes vulpes)"` -> `"Red fox"`.
pub fn common_name(label: &str) -> &str {
    label
        .rsplit_once(" (")
        .map(|(common, _)| common.trim())
        .filter(|common| !common.is_empty())
        .unwrap_or(label.trim())
}

pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn reference_url(template: &str, label: &str) -> String {
    template.replace("{name}", &urlencoding::encode(scientific_name(label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_round_trip_through_listing() {
        let name = artifact_file_name("Canis lupus");
        assert_eq!(name, "Canis_lupus_prey_hierarchy.json");
        assert_eq!(predator_from_file_name(&name).as_deref(), Some("Canis lupus"));
        assert_eq!(predator_from_file_name("notes.json"), None);
        assert_eq!(predator_from_file_name(ARTIFACT_SUFFIX), None);
    }

    #[test]
    fn label_parts() {
        assert_eq!(scientific_name("Red fox (Vulpes vulpes)"), "Vulpes vulpes");
        assert_eq!(common_name("Red fox (Vulpes vulpes)"), "Red fox");
        assert_eq!(scientific_name("Cervidae"), "Cervidae");
        assert_eq!(common_name("Cervidae"), "Cervidae");
        assert_eq!(scientific_name("Mouse (house) (Mus musculus)"), "Mus musculus");
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn reference_url_encodes_scientific_name() {
        assert_eq!(
            reference_url("https://www.gbif.org/search?q={name}", "Red fox (Vulpes vulpes)"),
            "https://www.gbif.org/search?q=Vulpes%20vulpes"
        );
    }
}
