use seatplan_core::{SeatKey, SeatingService};

fn key(text: &str) -> SeatKey {
    text.parse().unwrap()
}

fn seated_service() -> (SeatingService, Vec<String>) {
    let mut service = SeatingService::default();
    service.resize(6, 6).unwrap();
    let mut ids = Vec::new();
    for (name, seat) in [("A", "3-5"), ("B", "5-1"), ("C", "6-6"), ("D", "1-1")] {
        let id = service.add_student(name, "").unwrap().id;
        service.place(&id, key(seat)).unwrap();
        ids.push(id);
    }
    (service, ids)
}

#[test]
fn shrinking_drops_only_out_of_bounds_entries() {
    let (mut service, ids) = seated_service();
    let preview = service.preview_resize(4, 6).unwrap();
    assert!(preview.needs_confirmation);
    assert_eq!(preview.dropped_seats, vec![key("5-1"), key("6-6")]);
    assert_eq!(service.state().seat_map.len(), 4);

    let report = service.resize(4, 6).unwrap();
    assert_eq!(report.dropped, 2);
    assert_eq!(service.state().seat_of(&ids[0]), Some(key("3-5")));
    assert_eq!(service.state().seat_of(&ids[3]), Some(key("1-1")));
    assert_eq!(service.state().students.len(), 4);
}

#[test]
fn growing_keeps_every_entry() {
    let (mut service, _) = seated_service();
    let before = service.state().seat_map.clone();
    let report = service.resize(10, 8).unwrap();
    assert_eq!(report.dropped, 0);
    assert_eq!(service.state().seat_map, before);
}

#[test]
fn invalid_dimensions_leave_state_untouched() {
    let (mut service, _) = seated_service();
    let before = service.state().clone();
    assert!(service.resize(0, 4).is_err());
    assert!(service.resize(4, 9).is_err());
    assert_eq!(service.state(), &before);
}

#[test]
fn empty_state_needs_no_confirmation() {
    let service = SeatingService::default();
    let preview = service.preview_resize(2, 2).unwrap();
    assert!(!preview.needs_confirmation);
    assert!(service.preview_resize(4, 6).unwrap().is_noop());
}
