//! Terminal front end for the campusreg client.
//!
//! Credentials and the backend address come from the environment
//! (`CAMPUSREG_BASE_URL`, `CAMPUSREG_USER`, `CAMPUSREG_PASS`); without
//! credentials every command runs with guest capabilities. Mutation
//! outcomes print one `✓`/`✗` line carrying the server message verbatim.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::error;

use campusreg::client::{CatalogClient, CatalogConfig};
use campusreg::filter::FilterCategory;
use campusreg::schedule;
use campusreg::session::{Action, Role, ViewSession};
use campusreg::timeslot::{resolve_period, resolve_weekday_symbol, PERIOD_TIMES};
use campusreg::types::{CourseRecord, EnrollmentStatus};
use campusreg::CatalogError;

const USAGE: &str = "\
campusreg <command> [args]

commands:
  departments                         list departments
  semesters                           list semesters
  search [--keyword K] [--semester S] [--department D] [--grade G]
         [--type T] [--weekday 1,5] [--period 2,3] [--degree 四技]
         [--category 跨校]            search the catalog
  course <id>                         show one course
  schedule                            render my weekly schedule (student)
  favorites                           list my favorites (student)
  enroll <course_id> [--favorite]     preselect (or favorite) a course
  drop <enrollment_id>                remove a favorite/preselect
  delete-course <id>                  delete a course (admin)
  import <file> <semester>            import a course spreadsheet (admin)
  accounts                            list user accounts (admin)
  reset-password <user_id>            reset an account password (admin)
  logout                              end the server session";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let client = CatalogClient::with_config(config_from_env())?;
    let mut session = establish_session(&client).await?;

    let result = run_command(&client, &mut session, command, &args[1..]).await;
    if let Err(err) = result {
        match err.downcast_ref::<CatalogError>() {
            Some(api_err) => {
                error!(error = %api_err, "Command failed");
                println!("{}", api_err.user_line());
                std::process::exit(1);
            }
            None => return Err(err),
        }
    }
    Ok(())
}

fn init_tracing() {
    let level = match std::env::var("CAMPUSREG_LOG").as_deref() {
        Ok("debug") => tracing::Level::DEBUG,
        Ok("warn") => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn config_from_env() -> CatalogConfig {
    let mut config = CatalogConfig::default();
    if let Ok(base_url) = std::env::var("CAMPUSREG_BASE_URL") {
        config.base_url = base_url;
    }
    if let Ok(secs) = std::env::var("CAMPUSREG_TIMEOUT_SECS") {
        if let Ok(secs) = secs.parse() {
            config.timeout = Duration::from_secs(secs);
        }
    }
    config
}

/// Logs in when credentials are present; browses as guest otherwise.
async fn establish_session(client: &CatalogClient) -> Result<ViewSession> {
    let (user, pass) = (
        std::env::var("CAMPUSREG_USER").ok(),
        std::env::var("CAMPUSREG_PASS").ok(),
    );
    let role = match (user, pass) {
        (Some(user), Some(pass)) => {
            let identity = client.login(&user, &pass).await?;
            Role::from_role_str(&identity.role)
        }
        _ => Role::Guest,
    };
    Ok(ViewSession::new(role))
}

async fn run_command(
    client: &CatalogClient,
    session: &mut ViewSession,
    command: &str,
    args: &[String],
) -> Result<()> {
    match command {
        "departments" => {
            for dept in client.departments().await? {
                println!("{dept}");
            }
        }
        "semesters" => {
            for semester in client.semesters().await? {
                println!("{semester}");
            }
        }
        "search" => search(client, session, args).await?,
        "course" => {
            let id = positional(args, 0, "course id")?;
            let course = client.course(id).await?;
            print_course_detail(&course);
        }
        "schedule" => {
            require(session, Action::AddPreselect)?;
            let records = client.my_courses(Some(EnrollmentStatus::Enrolled)).await?;
            let grid = schedule::project(&records);
            print_schedule(&grid);
        }
        "favorites" => {
            require(session, Action::AddFavorite)?;
            let records = client.my_courses(Some(EnrollmentStatus::Favorite)).await?;
            if records.is_empty() {
                println!("尚無收藏課程");
            }
            for rec in records {
                println!(
                    "[{}] {} / {} / {}",
                    rec.enrollment_id,
                    rec.course.semester.as_deref().unwrap_or(""),
                    rec.course.course_name.as_deref().unwrap_or(""),
                    rec.course.instructor.as_deref().unwrap_or(""),
                );
            }
        }
        "enroll" => {
            let course_id = positional(args, 0, "course id")?;
            let status = if args.iter().any(|a| a == "--favorite") {
                require(session, Action::AddFavorite)?;
                EnrollmentStatus::Favorite
            } else {
                require(session, Action::AddPreselect)?;
                EnrollmentStatus::Enrolled
            };
            let message = client.enroll(course_id, status).await?;
            println!("✓ {message}");
        }
        "drop" => {
            require(session, Action::DropEnrollment)?;
            let enrollment_id = positional(args, 0, "enrollment id")?;
            let message = client.drop_enrollment(enrollment_id).await?;
            println!("✓ {message}");
        }
        "delete-course" => {
            require(session, Action::DeleteCourse)?;
            let id = positional(args, 0, "course id")?;
            let message = client.delete_course(id).await?;
            println!("✓ {message}");
        }
        "import" => {
            require(session, Action::ImportCourses)?;
            let file = args.first().context("usage: import <file> <semester>")?;
            let semester = args.get(1).context("usage: import <file> <semester>")?;
            let report = client.import_courses(Path::new(file), semester).await?;
            println!("✓ {} (匯入 {} 筆)", report.message, report.count);
        }
        "accounts" => {
            require(session, Action::ManageAccounts)?;
            let listing = client.accounts().await?;
            println!("學生 ({}):", listing.students.len());
            for account in &listing.students {
                println!(
                    "  [{}] {} {}",
                    account.id,
                    account.username.as_deref().unwrap_or(""),
                    account.name.as_deref().unwrap_or(""),
                );
            }
            println!("管理員 ({}):", listing.admins.len());
            for account in &listing.admins {
                println!(
                    "  [{}] {} {}",
                    account.id,
                    account.username.as_deref().unwrap_or(""),
                    account.name.as_deref().unwrap_or(""),
                );
            }
        }
        "reset-password" => {
            require(session, Action::ManageAccounts)?;
            let user_id = positional(args, 0, "user id")?;
            let message = client.reset_password(user_id).await?;
            println!("✓ {message}");
        }
        "logout" => {
            let message = client.logout().await?;
            println!("✓ {message}");
        }
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    }
    Ok(())
}

fn require(session: &ViewSession, action: Action) -> Result<()> {
    if !session.role.can(action) {
        bail!("此身分無法執行這個操作，請先登入對應帳號");
    }
    Ok(())
}

fn positional(args: &[String], index: usize, what: &str) -> Result<i64> {
    args.get(index)
        .with_context(|| format!("missing {what}"))?
        .parse()
        .with_context(|| format!("{what} must be a number"))
}

/// Fills the session filters from `--flag value` pairs and runs the search.
async fn search(client: &CatalogClient, session: &mut ViewSession, args: &[String]) -> Result<()> {
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("flag {flag} needs a value"))?;
        match flag.as_str() {
            "--keyword" => session.filters.keyword = value.clone(),
            "--semester" => session.filters.semester = value.clone(),
            "--department" => session.filters.department = value.clone(),
            "--grade" => session.filters.grade = value.clone(),
            "--type" => session.filters.course_type = value.clone(),
            "--weekday" | "--period" | "--degree" | "--category" => {
                let category = match flag.as_str() {
                    "--weekday" => FilterCategory::Weekday,
                    "--period" => FilterCategory::Period,
                    "--degree" => FilterCategory::Degree,
                    _ => FilterCategory::Category,
                };
                for v in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                    session.filters.toggle(category, v, true);
                }
            }
            other => bail!("unknown search flag `{other}`"),
        }
    }

    let token = session.begin_search();
    let outcome = client.search_courses(&session.filters).await?;
    if !session.accept(token) {
        // a newer search superseded this one; drop the stale result
        return Ok(());
    }

    if outcome.items.is_empty() {
        println!("沒有找到符合的課程");
        return Ok(());
    }
    println!("找到 {} 筆課程 ({})", outcome.count, outcome.fetched_at);
    for course in &outcome.items {
        print_course_row(course);
    }
    Ok(())
}

fn print_course_row(course: &CourseRecord) {
    let weekday = resolve_weekday_symbol(course).unwrap_or("");
    let period = resolve_period(course).unwrap_or_default();
    println!(
        "[{}] {} | {} | {} | {} | {} | {} 學分 | 週{} {} 節 | {}",
        course.id,
        course.semester.as_deref().unwrap_or(""),
        course.department.as_deref().unwrap_or(""),
        course.course_name.as_deref().unwrap_or(""),
        course.instructor.as_deref().unwrap_or(""),
        course.course_type.as_deref().unwrap_or(""),
        course.credits.as_deref().unwrap_or(""),
        weekday,
        period,
        course.classroom.as_deref().unwrap_or(""),
    );
}

fn print_course_detail(course: &CourseRecord) {
    println!("課程代碼: {}", course.course_code.as_deref().unwrap_or(""));
    println!("課程名稱: {}", course.course_name.as_deref().unwrap_or(""));
    println!("授課教師: {}", course.instructor.as_deref().unwrap_or(""));
    println!("學分數:   {}", course.credits.as_deref().unwrap_or(""));
    println!("課別:     {}", course.course_type.as_deref().unwrap_or(""));
    let capacity = course
        .capacity
        .map(|c| c.to_string())
        .unwrap_or_default();
    println!("上課人數: {capacity}");
    println!("班組:     {}", course.class_group.as_deref().unwrap_or(""));
    let time = match (resolve_weekday_symbol(course), resolve_period(course)) {
        (Some(day), Some(period)) => format!("週{day}，{period}節"),
        _ => course.day_time.clone().unwrap_or_else(|| "無".to_string()),
    };
    println!("時間:     {time}");
    println!("教室:     {}", course.classroom.as_deref().unwrap_or(""));
    println!("備註:     {}", course.remarks.as_deref().unwrap_or("無"));
}

fn print_schedule(grid: &schedule::ScheduleGrid) {
    println!("節次  時間         一      二      三      四      五      六      日");
    for (period, time) in PERIOD_TIMES {
        let mut line = format!("{period:>2}  {time}  ");
        for cell in grid.row(period) {
            let text = cell
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default();
            line.push_str(&format!("{:<8}", truncate(&text, 6)));
        }
        println!("{}", line.trim_end());
    }
    println!("總學分: {}", grid.total_credits);
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
