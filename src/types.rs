/// Wire types for the catalog backend's JSON payloads
use serde::{Deserialize, Deserializer, Serialize};

/// A course row as served by the backend.
///
/// All descriptive fields are optional: imported spreadsheets leave holes,
/// and the two scheduling shapes (structured `weekday` + `period`, or
/// free-text `day_time`) are mutually exclusive in practice but never
/// guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default)]
    pub id: i64,
    pub semester: Option<String>,
    pub department: Option<String>,
    pub grade: Option<String>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub instructor: Option<String>,
    /// Stored as REAL server-side but observed as both number and string
    /// on the wire; kept as text and parsed on demand.
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub credits: Option<String>,
    pub course_type: Option<String>,
    pub classroom: Option<String>,
    /// Structured day code "1".."7" (Monday through Sunday)
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub weekday: Option<String>,
    /// Structured period slots: single value, comma list, or dash range
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub period: Option<String>,
    /// Free-text time placement, e.g. "週五，2-4節"; parsed only when the
    /// structured fields are absent
    pub day_time: Option<String>,
    pub capacity: Option<i64>,
    pub class_group: Option<String>,
    pub remarks: Option<String>,
}

impl CourseRecord {
    /// Credit value for totaling, `parseFloat`-style: leading numeric text
    /// counts, anything unparseable counts as zero.
    pub fn credit_value(&self) -> f64 {
        self.credits
            .as_deref()
            .map(parse_leading_f64)
            .unwrap_or(0.0)
    }
}

/// Parses the leading floating-point prefix of a string, 0.0 if none.
fn parse_leading_f64(s: &str) -> f64 {
    let s = s.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            '-' | '+' if i == 0 => end = i + 1,
            _ => break,
        }
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Accepts a JSON string or number and yields it as text.
///
/// Integral floats are rendered without the trailing ".0" so that a REAL
/// column holding 3.0 displays as "3", matching the original UI.
fn de_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            } else {
                Some(n.to_string())
            }
        }
        _ => None,
    })
}

/// The enrollment relationship states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Bookmark without provisional enrollment
    Favorite,
    /// Preselected onto the weekly schedule
    Enrolled,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Favorite => "favorite",
            EnrollmentStatus::Enrolled => "enrolled",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course joined with the caller's enrollment row.
///
/// The backend flattens `e.id AS enrollment_id, e.status, c.*` into one
/// object; status is mutable only by deleting and re-creating the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub enrollment_id: i64,
    pub status: EnrollmentStatus,
    #[serde(flatten)]
    pub course: CourseRecord,
}

/// The caller's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: i64,
    pub username: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub class_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Editable subset of the profile (everything else is read-only for the
/// owner).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A user row from the admin account listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: i64,
    pub username: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub class_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Payload for creating a user account (admin).
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Payload for updating a user account (admin); every field is written,
/// blanks overwrite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    pub name: String,
    pub student_id: String,
    pub department: String,
    pub class_name: String,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub avatar: String,
}

/// Payload for creating or updating a course (admin).
///
/// The same shape serves POST and PUT; the server fills defaults for
/// anything omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseDraft {
    pub semester: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub course_code: String,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Result of a spreadsheet import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub count: u64,
    pub message: String,
}

/// Search results with the moment they were fetched.
///
/// The stamp lets a caller tell a stale display apart from a fresh one
/// when an older in-flight response settles late.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub count: u64,
    pub items: Vec<CourseRecord>,
    pub fetched_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_record_lenient_fields() {
        // weekday/period/credits arrive as numbers from some backends
        let json = r#"{"id": 7, "course_name": "微積分", "weekday": 3, "period": "2-4", "credits": 3.0}"#;
        let course: CourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(course.weekday.as_deref(), Some("3"));
        assert_eq!(course.period.as_deref(), Some("2-4"));
        assert_eq!(course.credits.as_deref(), Some("3"));
        assert_eq!(course.credit_value(), 3.0);
    }

    #[test]
    fn test_credit_value_fallback() {
        let mut course = CourseRecord::default();
        assert_eq!(course.credit_value(), 0.0);
        course.credits = Some("2.5".to_string());
        assert_eq!(course.credit_value(), 2.5);
        course.credits = Some("abc".to_string());
        assert_eq!(course.credit_value(), 0.0);
        // parseFloat semantics: leading numeric prefix counts
        course.credits = Some("3學分".to_string());
        assert_eq!(course.credit_value(), 3.0);
    }

    #[test]
    fn test_enrollment_record_flattened() {
        let json = r#"{
            "enrollment_id": 42,
            "status": "enrolled",
            "id": 7,
            "course_name": "代數",
            "weekday": "1",
            "period": "2-3",
            "credits": "3",
            "classroom": "R101"
        }"#;
        let rec: EnrollmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.enrollment_id, 42);
        assert_eq!(rec.status, EnrollmentStatus::Enrolled);
        assert_eq!(rec.course.course_name.as_deref(), Some("代數"));
        assert_eq!(rec.course.classroom.as_deref(), Some("R101"));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Favorite).unwrap(),
            "\"favorite\""
        );
        let status: EnrollmentStatus = serde_json::from_str("\"enrolled\"").unwrap();
        assert_eq!(status, EnrollmentStatus::Enrolled);
    }
}
