use crate::model::{FieldDiff, FieldMapping};
use crate::record::Record;

/// Compare every mapping pair case-insensitively. Absent values read as "".
///
/// Returns the differing pairs in mapping order; empty means the pair matched.
pub fn compare_fields(left: &Record, right: &Record, mappings: &[FieldMapping]) -> Vec<FieldDiff> {
    mappings
        .iter()
        .filter_map(|m| {
            let left_value = left.text(&m.left);
            let right_value = right.text(&m.right);
            if left_value.to_lowercase() == right_value.to_lowercase() {
                None
            } else {
                Some(FieldDiff {
                    left_field: m.left.clone(),
                    right_field: m.right.clone(),
                    left_value,
                    right_value,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn equal_ignoring_case() {
        let l = rec(&[("Desc", "Widget BOX")]);
        let r = rec(&[("Name", "widget box")]);
        assert!(compare_fields(&l, &r, &[FieldMapping::new("Desc", "Name")]).is_empty());
    }

    #[test]
    fn difference_reports_both_names() {
        let l = rec(&[("Desc", "foo")]);
        let r = rec(&[("Name", "bar")]);
        let diffs = compare_fields(&l, &r, &[FieldMapping::new("Desc", "Name")]);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].left_field, "Desc");
        assert_eq!(diffs[0].right_field, "Name");
        assert_eq!(diffs[0].left_value, "foo");
        assert_eq!(diffs[0].right_value, "bar");
    }

    #[test]
    fn absent_equals_empty() {
        let l = rec(&[("Notes", "")]);
        let r = rec(&[]);
        assert!(compare_fields(&l, &r, &[FieldMapping::new("Notes", "BOM notes")]).is_empty());
    }

    #[test]
    fn number_against_text() {
        let l = Record::new(vec![("Kit Qty".into(), CellValue::Number(4.0))]);
        let r = rec(&[("Quantity", "4")]);
        assert!(compare_fields(&l, &r, &[FieldMapping::new("Kit Qty", "Quantity")]).is_empty());

        let r2 = rec(&[("Quantity", "4.0")]);
        assert_eq!(compare_fields(&l, &r2, &[FieldMapping::new("Kit Qty", "Quantity")]).len(), 1);
    }

    #[test]
    fn keeps_mapping_order() {
        let l = rec(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let r = rec(&[("x", "9"), ("y", "2"), ("z", "8")]);
        let maps = [
            FieldMapping::new("c", "z"),
            FieldMapping::new("b", "y"),
            FieldMapping::new("a", "x"),
        ];
        let diffs = compare_fields(&l, &r, &maps);
        let names: Vec<_> = diffs.iter().map(|d| d.left_field.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn no_mappings_never_differs() {
        let l = rec(&[("a", "1")]);
        let r = rec(&[("a", "2")]);
        assert!(compare_fields(&l, &r, &[]).is_empty());
    }
}
