//! Table formatting utilities

use glam::{Mat4, Quat, Vec3};
use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

pub fn add_table_row(table: &mut Table, cells: &[String]) {
    table.add_row(Row::new(cells.iter().map(|s| Cell::new(s)).collect()));
}

pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

pub fn format_quat(q: Quat) -> String {
    format!("({:.3}, {:.3}, {:.3}, {:.3})", q.x, q.y, q.z, q.w)
}

/// Translation and rotation of an affine matrix
pub fn format_matrix_summary(m: &Mat4) -> (String, String) {
    let (_, rotation, translation) = m.to_scale_rotation_translation();
    (format_vec3(translation), format_quat(rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_matrix_summary() {
        let m = Mat4::from_translation(Vec3::new(1.0, -2.5, 0.0));
        let (translation, rotation) = format_matrix_summary(&m);
        assert_eq!(translation, "(1.000, -2.500, 0.000)");
        assert_eq!(rotation, "(0.000, 0.000, 0.000, 1.000)");
    }

    #[test]
    fn test_table_has_rows() {
        let mut table = create_table(&["Id", "Name"]);
        add_table_row(&mut table, &["0".to_string(), "Hips".to_string()]);
        assert_eq!(table.len(), 1);
        assert!(table.to_string().contains("Hips"));
    }
}
