mod common;

use std::fs;

use common::{voter, Workspace};
use voter_roll::export::read_records;
use voter_roll::{
    Criterion, DeleteOutcome, SaveTarget, SortDirection, SortField, SortSource,
};

#[test]
fn petrov_lifecycle() {
    let ws = Workspace::new("petrov");
    let mut session = ws.create_session();

    let inserted = session
        .insert(&voter("Petrov", "Ivan", "1990", "Lenina 10 5", "Kazan"))
        .unwrap();
    assert_eq!(inserted.record.id, 1);
    assert_eq!(inserted.record.address, "Ul. Lenina, d. 10, kv. 5");

    let found = session.search(&Criterion::ByBirthYear(1990)).unwrap();
    assert_eq!(found, vec![inserted.record.clone()]);

    assert!(matches!(
        session.delete(1).unwrap(),
        DeleteOutcome::Deleted { .. }
    ));
    assert_eq!(session.delete(1).unwrap(), DeleteOutcome::NotFound);
    assert!(session.list_all().unwrap().is_empty());
}

#[test]
fn identifiers_strictly_increase_even_after_deletes() {
    let ws = Workspace::new("ids");
    let mut session = ws.create_session();

    let mut previous = 0;
    for (index, surname) in ["Adams", "Baker", "Clark", "Davis"].iter().enumerate() {
        let id = session
            .insert(&voter(surname, "Ivan", "1980", "Lenina 1 1", "Kazan"))
            .unwrap()
            .record
            .id;
        assert!(id > previous);
        previous = id;
        if index == 1 {
            session.delete(id).unwrap();
        }
    }
    assert_eq!(session.count().unwrap(), 3);
}

#[test]
fn delete_removes_exactly_one_line_and_keeps_order() {
    let ws = Workspace::new("prune");
    let mut session = ws.create_session();
    for surname in ["Adams", "Baker", "Clark"] {
        session
            .insert(&voter(surname, "Ivan", "1980", "Lenina 1 1", "Kazan"))
            .unwrap();
    }

    let criterion = Criterion::ByBirthCity("Kazan".into());
    session.search(&criterion).unwrap();
    session
        .save_search_results(&criterion, &SaveTarget::Default)
        .unwrap();

    let path = ws.file("city_sort.txt");
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("garbage line without id\n");
    fs::write(&path, &text).unwrap();
    let before: Vec<String> = text.lines().map(str::to_string).collect();

    assert!(matches!(
        session.delete(2).unwrap(),
        DeleteOutcome::Deleted { .. }
    ));

    let after: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    let expected: Vec<String> = before
        .into_iter()
        .filter(|line| !line.starts_with("2 ") && !line.starts_with("2|"))
        .collect();
    assert_eq!(after, expected);
    assert!(after.iter().any(|line| line.contains("garbage")));
    assert_eq!(session.count().unwrap(), 2);
}

#[test]
fn ascending_and_descending_are_reverses() {
    let ws = Workspace::new("reverse");
    let mut session = ws.create_session();
    for (surname, year) in [("Morozov", "1971"), ("Abramov", "1999"), ("Kuznetsov", "1945")] {
        session
            .insert(&voter(surname, "Ivan", year, "Lenina 1 1", "Kazan"))
            .unwrap();
    }
    let all = session.list_all().unwrap();
    session
        .save_sorted(SortField::BirthYear, &SaveTarget::Custom("snapshot".into()), &all)
        .unwrap();

    let source = session.file_source("snapshot").unwrap();
    let ascending = session
        .sort(&source, SortField::Surname, SortDirection::Ascending)
        .unwrap()
        .records;
    let mut descending = session
        .sort(&source, SortField::Surname, SortDirection::Descending)
        .unwrap()
        .records;
    descending.reverse();
    assert_eq!(ascending, descending);
    assert_eq!(ascending[0].surname, "Abramov");
}

#[test]
fn exported_results_read_back_as_the_same_records() {
    let ws = Workspace::new("roundtrip");
    let mut session = ws.create_session();
    session
        .insert(&voter("Petrov", "Ivan", "1990", "Lenina 10 5", "Kazan"))
        .unwrap();
    session
        .insert(&voter("Orlova", "Anna Maria", "1990", "Mira 3 12", "Nizhny Novgorod"))
        .unwrap();
    session
        .insert(&voter("Smirnov", "Oleg", "1970", "Lenina 2 2", "Omsk"))
        .unwrap();

    let criterion = Criterion::ByBirthYear(1990);
    let expected = session.search(&criterion).unwrap();
    session
        .save_search_results(&criterion, &SaveTarget::Default)
        .unwrap();

    let outcome = session
        .sort(
            &SortSource::File(ws.file("year_sort.txt")),
            SortField::BirthYear,
            SortDirection::Ascending,
        )
        .unwrap();
    assert!(outcome.skipped.is_empty());
    let mut ids: Vec<i64> = outcome.records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, expected.iter().map(|r| r.id).collect::<Vec<_>>());
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome
        .records
        .iter()
        .any(|r| r.given_name == "Anna Maria" && r.birth_city == "Nizhny Novgorod"));
}

#[test]
fn city_cache_follows_matching_inserts_only() {
    let ws = Workspace::new("city");
    let mut session = ws.create_session();
    session
        .insert(&voter("Petrov", "Ivan", "1990", "Lenina 10 5", "Kazan"))
        .unwrap();

    let criterion = Criterion::ByBirthCity("Kazan".into());
    session.search(&criterion).unwrap();
    session
        .save_search_results(&criterion, &SaveTarget::Default)
        .unwrap();

    session
        .insert(&voter("Orlov", "Ivan", "1980", "Mira 1 1", "Omsk"))
        .unwrap();
    let matching = session
        .insert(&voter("Sokolov", "Ivan", "1985", "Mira 2 2", "Kazan"))
        .unwrap();
    assert!(matching
        .sync
        .appended
        .contains(&"city_sort.txt".to_string()));

    let records = read_records(&ws.file("city_sort.txt")).unwrap().records;
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn sort_cache_gets_stale_appends() {
    let ws = Workspace::new("stale");
    let mut session = ws.create_session();
    session
        .insert(&voter("Petrov", "Ivan", "1990", "Lenina 10 5", "Kazan"))
        .unwrap();
    let sorted = session
        .sort(&SortSource::LiveTable, SortField::BirthYear, SortDirection::Ascending)
        .unwrap();
    session
        .save_sorted(SortField::BirthYear, &SaveTarget::Default, &sorted.records)
        .unwrap();

    let inserted = session
        .insert(&voter("Orlov", "Ivan", "2000", "Mira 1 1", "Omsk"))
        .unwrap();
    assert_eq!(inserted.record.id, 2);
    assert!(inserted
        .sync
        .appended
        .contains(&"sorted_godrozh.txt".to_string()));

    let years: Vec<i32> = read_records(&ws.file("sorted_godrozh.txt"))
        .unwrap()
        .records
        .iter()
        .map(|r| r.birth_year)
        .collect();
    assert_eq!(years, vec![1990, 2000]);
}

#[test]
fn delimiter_in_a_street_never_reaches_a_flat_file() {
    let ws = Workspace::new("delimiter");
    let mut session = ws.create_session();
    let err = session
        .insert(&voter("Petrov", "Ivan", "1990", "Le|nina 10 5", "Kazan"))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(session.count().unwrap(), 0);

    let inserted = session
        .insert(&voter("Petrov", "Ivan", "1990", "Lenina 10 5", "Kazan"))
        .unwrap();
    let criterion = Criterion::ByBirthYear(1990);
    session.search(&criterion).unwrap();
    session
        .save_search_results(&criterion, &SaveTarget::Default)
        .unwrap();

    let path = ws.file("year_sort.txt");
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("9  | Orlov | Ivan | Ivanovich | 1990 | Ul. Mi | ra, d. 1, kv. 1 | Omsk\n");
    fs::write(&path, text).unwrap();

    let outcome = session
        .sort(&SortSource::File(path), SortField::BirthYear, SortDirection::Ascending)
        .unwrap();
    assert_eq!(outcome.records, vec![inserted.record]);
    assert_eq!(outcome.skipped.len(), 1);
}
