use blockwise_core::{
    GoalSpec, Priority, ScheduleError, Scheduler, TaskKind, TaskRecord, format_hhmm, parse_date,
    parse_hhmm,
};
use chrono::NaiveTime;

fn hm(s: &str) -> NaiveTime {
    parse_hhmm(s).unwrap()
}

fn start_of(schedule: &[TaskRecord], title: &str) -> String {
    let rec = schedule
        .iter()
        .find(|t| t.title == title)
        .unwrap_or_else(|| panic!("{title} missing from schedule"));
    format_hhmm(rec.start_time.unwrap())
}

/// Exam at noon, three low-priority chores, and a windowed high-priority study block.
fn study_day() -> Scheduler {
    let mut s = Scheduler::new(parse_date("2025-07-01").unwrap());
    s.add_task(TaskRecord::fixed("exam", "Exam", hm("12:00"), 60));
    s.add_task(
        TaskRecord::new("chores", "Chores")
            .with_duration(120)
            .with_priority(Priority::Low),
    );
    s.add_task(
        TaskRecord::new("tv", "Watch TV")
            .with_duration(60)
            .with_priority(Priority::Low),
    );
    s.add_task(
        TaskRecord::new("lunch", "Lunch")
            .with_duration(120)
            .with_priority(Priority::Low),
    );
    s.add_task(
        TaskRecord::new("study", "Study")
            .with_duration(180)
            .with_priority(Priority::High)
            .with_window(Some(hm("15:00")), Some(hm("22:00"))),
    );
    s
}

#[test]
fn high_priority_study_takes_its_earliest_slot() {
    let s = study_day();
    let schedule = s.schedule().unwrap();
    assert_eq!(start_of(&schedule, "Study"), "15:00");
    assert_eq!(start_of(&schedule, "Chores"), "09:00");
    assert_eq!(start_of(&schedule, "Watch TV"), "11:00");
    assert_eq!(start_of(&schedule, "Lunch"), "13:00");
}

#[test]
fn moving_study_pushes_lunch_to_afternoon() {
    let mut s = study_day();
    s.schedule().unwrap();

    assert!(s.move_task("study", Some(hm("09:00")), Some(hm("17:00"))));
    let schedule = s.schedule().unwrap();
    assert_eq!(start_of(&schedule, "Study"), "09:00");
    assert_eq!(start_of(&schedule, "Lunch"), "16:00");
}

#[test]
fn removing_exam_frees_noon_for_chores() {
    let mut s = study_day();
    s.move_task("study", Some(hm("09:00")), Some(hm("17:00")));
    s.schedule().unwrap();

    assert!(s.remove_task("exam"));
    let schedule = s.schedule().unwrap();
    assert_eq!(start_of(&schedule, "Chores"), "12:00");
    assert!(schedule.iter().all(|t| t.id != "exam"));
}

#[test]
fn fixed_task_times_survive_pressure() {
    let s = study_day();
    let schedule = s.schedule().unwrap();
    let exam = schedule.iter().find(|t| t.id == "exam").unwrap();
    assert_eq!(exam.start_time, Some(hm("12:00")));
    assert_eq!(exam.end_time, Some(hm("13:00")));
}

#[test]
fn scheduling_twice_is_identical() {
    let s = study_day();
    let first = s.schedule().unwrap();
    let second = s.schedule().unwrap();
    assert_eq!(first, second);
}

#[test]
fn fixed_task_without_start_time_fails_whole_run() {
    let mut s = study_day();
    let mut broken = TaskRecord::new("dentist", "Dentist").with_duration(30);
    broken.fixed = true;
    s.add_task(broken);

    let err = s.schedule().unwrap_err();
    assert_eq!(
        err,
        ScheduleError::MissingStartTime {
            id: "dentist".into(),
            title: "Dentist".into(),
        }
    );
    assert!(err.to_string().contains("missing a start_time"));
}

#[test]
fn placed_records_serialize_with_iso_date_and_hhmm() {
    let s = study_day();
    let schedule = s.schedule().unwrap();
    let json = serde_json::to_value(&schedule).unwrap();
    let first = &json[0];
    assert_eq!(first["date"], "2025-07-01");
    assert_eq!(first["start_time"], "09:00");
    assert_eq!(first["end_time"], "11:00");
}

#[test]
fn periodic_goal_lands_on_each_day() {
    let mut s = Scheduler::new(parse_date("2025-07-01").unwrap());
    let range = blockwise_core::DateRange::parse("2025-07-01", "2025-07-03").unwrap();
    s.add_goal_periodic(&GoalSpec::new("Piano", 150, 30).with_rest(10), range)
        .unwrap();

    let schedule = s.schedule().unwrap();
    for date in ["2025-07-01", "2025-07-02", "2025-07-03"] {
        let d = parse_date(date).unwrap();
        let minutes: i64 = schedule
            .iter()
            .filter(|t| t.date == Some(d) && t.kind == TaskKind::GoalBlock)
            .map(|t| t.duration)
            .sum();
        assert_eq!(minutes, 50, "goal minutes on {date}");
    }

    // 30 + rest + 20 per day; the low-priority rest is seated after both blocks.
    let day_one: Vec<TaskKind> = schedule
        .iter()
        .filter(|t| t.date == parse_date("2025-07-01").ok())
        .map(|t| t.kind)
        .collect();
    assert_eq!(day_one, [TaskKind::GoalBlock, TaskKind::GoalBlock, TaskKind::Rest]);
}
