// ── Offline seed datasets ──
//
// Served when the backend cannot be reached. Each call builds a fresh copy,
// so repositories never share state.

use chrono::{DateTime, Utc};

use crate::model::{
    EntityId, PaymentMethod, Station, StationStatus, User, UserRole, UserStatus, WashStatus,
    WashingBayEntry,
};

fn at(rfc3339: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(rfc3339)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn fuels(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| (*f).to_owned()).collect()
}

#[allow(clippy::too_many_arguments)]
fn station(
    id: &str,
    code: &str,
    name: &str,
    region: &str,
    location: &str,
    status: StationStatus,
    pump_count: u32,
    fuel_types: &[&str],
    manager: Option<(&str, &str)>,
) -> Station {
    Station {
        id: EntityId::from(id),
        code: code.into(),
        name: name.into(),
        region: region.into(),
        location: location.into(),
        status,
        pump_count,
        fuel_types: fuels(fuel_types),
        manager_id: manager.map(|(id, _)| EntityId::from(id)),
        manager_name: manager.map(|(_, name)| name.to_owned()),
        created_at: at("2024-01-15T08:00:00Z"),
        updated_at: at("2024-06-01T12:30:00Z"),
    }
}

pub fn stations() -> Vec<Station> {
    use StationStatus::{Active, Inactive, Maintenance};

    vec![
        station("st-001", "AS-001", "Adum Filling Station", "Ashanti", "Adum, Kumasi", Active, 6,
            &["Petrol", "Diesel"], Some(("usr-002", "Kofi Mensah"))),
        station("st-002", "AS-002", "Kejetia Service Centre", "Ashanti", "Kejetia, Kumasi", Active, 8,
            &["Petrol", "Diesel", "LPG"], Some(("usr-005", "Akosua Asante"))),
        station("st-003", "AS-003", "Ejisu Roadside", "Ashanti", "Ejisu", Maintenance, 4,
            &["Petrol", "Diesel"], None),
        station("st-004", "GA-001", "Osu Oxford Street", "Greater Accra", "Osu, Accra", Active, 10,
            &["Petrol", "Diesel", "LPG"], Some(("usr-003", "Efua Addo"))),
        station("st-005", "GA-002", "Tema Community 1", "Greater Accra", "Tema", Inactive, 6,
            &["Petrol", "Diesel"], None),
        station("st-006", "NR-001", "Tamale Central", "Northern", "Tamale", Active, 5,
            &["Petrol", "Diesel"], Some(("usr-006", "Ibrahim Alhassan"))),
        station("st-007", "WR-001", "Takoradi Harbour Road", "Western", "Takoradi", Active, 6,
            &["Petrol", "Diesel", "Kerosene"], None),
        station("st-008", "VR-001", "Ho Main Station", "Volta", "Ho", Inactive, 3,
            &["Petrol"], None),
    ]
}

fn user(
    id: &str,
    full_name: &str,
    email: &str,
    phone: &str,
    role: UserRole,
    status: UserStatus,
    station: Option<(&str, &str)>,
) -> User {
    User {
        id: EntityId::from(id),
        full_name: full_name.into(),
        email: email.into(),
        phone: phone.into(),
        role,
        status,
        station_id: station.map(|(id, _)| EntityId::from(id)),
        station_name: station.map(|(_, name)| name.to_owned()),
        created_at: at("2024-02-01T09:00:00Z"),
        updated_at: at("2024-06-10T16:45:00Z"),
    }
}

pub fn users() -> Vec<User> {
    use UserRole::{Accountant, Admin, Attendant, Manager};
    use UserStatus::{Active, Inactive, Suspended};

    vec![
        user("usr-001", "Yaw Boateng", "yaw.boateng@fuelsync.example", "+233201110001", Admin, Active, None),
        user("usr-002", "Kofi Mensah", "kofi.mensah@fuelsync.example", "+233241110002", Manager, Active,
            Some(("st-001", "Adum Filling Station"))),
        user("usr-003", "Efua Addo", "efua.addo@fuelsync.example", "+233501110003", Manager, Active,
            Some(("st-004", "Osu Oxford Street"))),
        user("usr-004", "Ama Owusu", "ama.owusu@fuelsync.example", "0241110004", Attendant, Active,
            Some(("st-001", "Adum Filling Station"))),
        user("usr-005", "Akosua Asante", "akosua.asante@fuelsync.example", "+233271110005", Manager, Inactive,
            Some(("st-002", "Kejetia Service Centre"))),
        user("usr-006", "Ibrahim Alhassan", "ibrahim.alhassan@fuelsync.example", "+233551110006", Manager,
            Active, Some(("st-006", "Tamale Central"))),
        user("usr-007", "Kwame Darko", "kwame.darko@fuelsync.example", "0201110007", Attendant, Suspended,
            Some(("st-002", "Kejetia Service Centre"))),
        user("usr-008", "Abena Osei", "abena.osei@fuelsync.example", "+233261110008", Accountant, Active, None),
    ]
}

#[allow(clippy::too_many_arguments)]
fn wash(
    id: &str,
    station: (&str, &str),
    plate_number: &str,
    vehicle_type: &str,
    service_type: &str,
    amount: f64,
    payment_method: PaymentMethod,
    status: WashStatus,
    attendant: &str,
    recorded_at: &str,
) -> WashingBayEntry {
    WashingBayEntry {
        id: EntityId::from(id),
        station_id: EntityId::from(station.0),
        station_name: station.1.into(),
        plate_number: plate_number.into(),
        vehicle_type: vehicle_type.into(),
        service_type: service_type.into(),
        amount,
        payment_method,
        status,
        attendant: attendant.into(),
        recorded_at: at(recorded_at),
        updated_at: at(recorded_at),
    }
}

pub fn washing_bay() -> Vec<WashingBayEntry> {
    use PaymentMethod::{Card, Cash, MobileMoney};
    use WashStatus::{Cancelled, Completed, Pending};

    const ADUM: (&str, &str) = ("st-001", "Adum Filling Station");
    const KEJETIA: (&str, &str) = ("st-002", "Kejetia Service Centre");
    const OSU: (&str, &str) = ("st-004", "Osu Oxford Street");
    const TAMALE: (&str, &str) = ("st-006", "Tamale Central");

    vec![
        wash("wb-001", ADUM, "AS 1234-21", "Saloon", "Full Wash", 50.0, Cash, Completed, "Ama Owusu",
            "2024-06-12T08:15:00Z"),
        wash("wb-002", ADUM, "GR 5512-19", "SUV", "Exterior Wash", 40.0, MobileMoney, Completed, "Ama Owusu",
            "2024-06-12T09:40:00Z"),
        wash("wb-003", KEJETIA, "AS 8890-22", "Pickup", "Engine Wash", 70.0, Card, Pending, "Kwame Darko",
            "2024-06-12T10:05:00Z"),
        wash("wb-004", OSU, "GT 3021-20", "Saloon", "Interior Detailing", 120.0, MobileMoney, Completed,
            "Kojo Ampofo", "2024-06-12T11:30:00Z"),
        wash("wb-005", OSU, "GN 7710-23", "Bus", "Full Wash", 150.0, Cash, Cancelled, "Kojo Ampofo",
            "2024-06-12T13:00:00Z"),
        wash("wb-006", TAMALE, "NR 4410-18", "Motorbike", "Exterior Wash", 15.0, Cash, Completed,
            "Issah Mahama", "2024-06-12T14:20:00Z"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn seed_ids_are_unique() {
        let ids: HashSet<_> = stations().into_iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), stations().len());
        let ids: HashSet<_> = users().into_iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), users().len());
    }

    #[test]
    fn seed_records_pass_validation() {
        for s in stations() {
            assert!(crate::model::station::is_station_code(&s.code), "{}", s.code);
        }
        for u in users() {
            assert!(crate::model::user::is_email(&u.email), "{}", u.email);
            assert!(crate::model::user::is_phone(&u.phone), "{}", u.phone);
        }
        assert!(washing_bay().iter().all(|e| e.amount > 0.0));
    }

    #[test]
    fn seed_has_active_ashanti_stations() {
        let filters = Station::default_filters()
            .with("status", "ACTIVE")
            .with("region", "Ashanti");
        let hits: Vec<_> = stations().into_iter().filter(|s| s.matches(&filters)).collect();
        assert_eq!(hits.len(), 2);
    }
}
