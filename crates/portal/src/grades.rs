//! Grade page parsing.

use std::sync::LazyLock;

use easyjw_core::grades::CourseAttempt;
use scraper::{ElementRef, Html, Selector};

static GRADE_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#dataList").expect("static selector is valid"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("static selector is valid"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("static selector is valid"));
static DATA_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector is valid"));
static SEMESTER_SELECT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("select#kksj, select[name='kksj']").expect("static selector is valid")
});
static OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("static selector is valid"));

/// Parses the grade list page.
///
/// Columns are matched by header text, so reordered or extra columns are
/// tolerated. Rows with fewer cells than headers are skipped. Returns `None`
/// when the page has no grade table, which is what the portal serves once
/// the session is gone.
#[must_use]
pub fn parse_grade_table(html: &str) -> Option<Vec<CourseAttempt>> {
    let document = Html::parse_document(html);
    let table = document.select(&GRADE_TABLE).next()?;

    let mut rows = table.select(&ROW);
    let headers: Vec<String> = rows
        .by_ref()
        .find(|row| row.select(&HEADER_CELL).next().is_some())
        .map(|row| row.select(&HEADER_CELL).map(cell_text).collect())
        .unwrap_or_default();

    let mut attempts = Vec::new();
    for (position, row) in rows.enumerate() {
        let cells: Vec<String> = row.select(&DATA_CELL).map(cell_text).collect();
        if cells.is_empty() || cells.len() < headers.len() {
            continue;
        }

        let mut attempt = CourseAttempt {
            index: u32::try_from(position + 1).unwrap_or(u32::MAX),
            ..CourseAttempt::default()
        };
        for (header, value) in headers.iter().zip(cells) {
            assign(&mut attempt, header, value);
        }
        attempts.push(attempt);
    }

    Some(attempts)
}

/// Reads the term codes offered by the grade query form.
///
/// Returns `None` when the selector is missing.
#[must_use]
pub fn parse_semester_options(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let select = document.select(&SEMESTER_SELECT).next()?;

    Some(
        select
            .select(&OPTION)
            .filter_map(|option| option.value().attr("value"))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

fn assign(attempt: &mut CourseAttempt, header: &str, value: String) {
    match header {
        "序号" => {
            if let Ok(index) = value.parse() {
                attempt.index = index;
            }
        }
        "开课学期" => attempt.semester = value,
        "课程编号" => attempt.course_code = value,
        "课程名称" => attempt.course_name = value,
        "分组名" => attempt.group_name = value,
        "成绩" => attempt.score = value,
        "成绩标识" => attempt.score_tag = value,
        "学分" => attempt.credit = value,
        "总学时" => attempt.total_hours = value,
        "绩点" => attempt.grade_point = value,
        "补重学期" => attempt.retake_semester = value,
        "考核方式" => attempt.assessment_method = value,
        "考试性质" => attempt.exam_type = value,
        "课程属性" => attempt.course_attribute = value,
        "课程性质" => attempt.course_nature = value,
        "课程类别" => attempt.course_category = value,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRADE_PAGE: &str = r##"
        <html><body>
        <table id="dataList">
          <tr>
            <th>序号</th><th>开课学期</th><th>课程编号</th><th>课程名称</th>
            <th>成绩</th><th>学分</th><th>绩点</th><th>考试性质</th><th>备注</th>
          </tr>
          <tr>
            <td>1</td><td>2022-2023-1</td><td>MA201</td><td> 线性代数 </td>
            <td><a href="#">55</a></td><td>4</td><td>1.0</td><td>正常考试</td><td></td>
          </tr>
          <tr>
            <td>2</td><td>2022-2023-2</td><td>MA201</td><td>线性代数</td>
            <td>92</td><td>4</td><td>3.7</td><td>重修</td><td></td>
          </tr>
          <tr><td colspan="9">未查询到数据</td></tr>
        </table>
        </body></html>
    "##;

    #[test]
    fn test_parse_grade_table() {
        let attempts = parse_grade_table(GRADE_PAGE).unwrap();

        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].index, 1);
        assert_eq!(attempts[0].semester, "2022-2023-1");
        assert_eq!(attempts[0].course_name, "线性代数");
        assert_eq!(attempts[0].score, "55");
        assert_eq!(attempts[1].grade_point, "3.7");
        assert_eq!(attempts[1].exam_type, "重修");
    }

    #[test]
    fn test_missing_table_means_no_session() {
        assert!(parse_grade_table("<html><body>请先登录</body></html>").is_none());
    }

    #[test]
    fn test_empty_table() {
        let html = r#"<table id="dataList"><tr><th>序号</th></tr></table>"#;
        assert_eq!(parse_grade_table(html), Some(Vec::new()));
    }

    #[test]
    fn test_parse_semester_options() {
        let html = r#"
            <select id="kksj" name="kksj">
              <option value="">---请选择---</option>
              <option value="2023-2024-2">2023-2024-2</option>
              <option value=" 2023-2024-1 ">2023-2024-1</option>
            </select>"#;

        assert_eq!(
            parse_semester_options(html),
            Some(vec!["2023-2024-2".to_string(), "2023-2024-1".to_string()])
        );
        assert!(parse_semester_options("<div></div>").is_none());
    }
}
