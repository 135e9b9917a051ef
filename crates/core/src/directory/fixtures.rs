//! Built-in HIS sample patients.
//!
//! Served when the remote HIS cannot answer. The table is immutable; lookups build fresh
//! [`PatientRecord`] values.

use chrono::NaiveDate;

use crate::models::PatientRecord;

struct Fixture {
    national_id: Option<&'static str>,
    passport_id: Option<&'static str>,
    first_name_th: Option<&'static str>,
    middle_name_th: Option<&'static str>,
    last_name_th: Option<&'static str>,
    first_name_en: &'static str,
    middle_name_en: Option<&'static str>,
    last_name_en: &'static str,
    date_of_birth: (i32, u32, u32),
    phone_number: &'static str,
    email: Option<&'static str>,
    gender: &'static str,
    patient_hn: &'static str,
    hospital: &'static str,
}

const HOSPITAL_A: &str = "Hospital A";
const HOSPITAL_B: &str = "Hospital B";

static FIXTURES: &[Fixture] = &[
    Fixture {
        national_id: Some("1234567890123"),
        passport_id: None,
        first_name_th: Some("สมชาย"),
        middle_name_th: None,
        last_name_th: Some("ใจดี"),
        first_name_en: "Somchai",
        middle_name_en: None,
        last_name_en: "Jaidee",
        date_of_birth: (1985, 3, 15),
        phone_number: "0891234567",
        email: Some("somchai@email.com"),
        gender: "M",
        patient_hn: "HN001",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: Some("9876543210987"),
        passport_id: None,
        first_name_th: Some("สมหญิง"),
        middle_name_th: None,
        last_name_th: Some("รักดี"),
        first_name_en: "Somying",
        middle_name_en: None,
        last_name_en: "Rakdee",
        date_of_birth: (1990, 7, 20),
        phone_number: "0899876543",
        email: Some("somying@email.com"),
        gender: "F",
        patient_hn: "HN002",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: None,
        passport_id: Some("AB1234567"),
        first_name_th: None,
        middle_name_th: None,
        last_name_th: None,
        first_name_en: "John",
        middle_name_en: Some("William"),
        last_name_en: "Smith",
        date_of_birth: (1978, 11, 5),
        phone_number: "+1234567890",
        email: Some("john.smith@email.com"),
        gender: "M",
        patient_hn: "HN003",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: Some("1122334455667"),
        passport_id: None,
        first_name_th: Some("ประเสริฐ"),
        middle_name_th: Some("สุข"),
        last_name_th: Some("สมบูรณ์"),
        first_name_en: "Prasert",
        middle_name_en: Some("Suk"),
        last_name_en: "Sombun",
        date_of_birth: (1992, 2, 14),
        phone_number: "0823456789",
        email: Some("prasert@email.com"),
        gender: "M",
        patient_hn: "HN005",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: Some("2233445566778"),
        passport_id: None,
        first_name_th: Some("มาลี"),
        middle_name_th: None,
        last_name_th: Some("ดีใจ"),
        first_name_en: "Malee",
        middle_name_en: None,
        last_name_en: "Deejai",
        date_of_birth: (1988, 9, 30),
        phone_number: "0834567890",
        email: Some("malee@email.com"),
        gender: "F",
        patient_hn: "HN006",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: Some("3344556677889"),
        passport_id: None,
        first_name_th: Some("สมศักดิ์"),
        middle_name_th: None,
        last_name_th: Some("เก่งดี"),
        first_name_en: "Somsak",
        middle_name_en: None,
        last_name_en: "Kengdee",
        date_of_birth: (1980, 6, 25),
        phone_number: "0845678901",
        email: None,
        gender: "M",
        patient_hn: "HN007",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: None,
        passport_id: Some("CD9876543"),
        first_name_th: None,
        middle_name_th: None,
        last_name_th: None,
        first_name_en: "Sarah",
        middle_name_en: Some("Jane"),
        last_name_en: "Johnson",
        date_of_birth: (1995, 4, 12),
        phone_number: "+44123456789",
        email: Some("sarah.j@email.com"),
        gender: "F",
        patient_hn: "HN008",
        hospital: HOSPITAL_A,
    },
    Fixture {
        national_id: Some("1111222233334"),
        passport_id: None,
        first_name_th: Some("วิชัย"),
        middle_name_th: None,
        last_name_th: Some("สุขใจ"),
        first_name_en: "Wichai",
        middle_name_en: None,
        last_name_en: "Sukjai",
        date_of_birth: (1982, 5, 10),
        phone_number: "0812345678",
        email: None,
        gender: "M",
        patient_hn: "HN004",
        hospital: HOSPITAL_B,
    },
    Fixture {
        national_id: Some("4455667788990"),
        passport_id: None,
        first_name_th: Some("นิดา"),
        middle_name_th: None,
        last_name_th: Some("รุ่งเรือง"),
        first_name_en: "Nida",
        middle_name_en: None,
        last_name_en: "Rungruang",
        date_of_birth: (1993, 8, 18),
        phone_number: "0856789012",
        email: Some("nida@email.com"),
        gender: "F",
        patient_hn: "HN009",
        hospital: HOSPITAL_B,
    },
    Fixture {
        national_id: Some("5566778899001"),
        passport_id: None,
        first_name_th: Some("วีระ"),
        middle_name_th: Some("ชัย"),
        last_name_th: Some("วัฒนา"),
        first_name_en: "Weera",
        middle_name_en: Some("Chai"),
        last_name_en: "Wattana",
        date_of_birth: (1987, 12, 3),
        phone_number: "0867890123",
        email: Some("weera@email.com"),
        gender: "M",
        patient_hn: "HN010",
        hospital: HOSPITAL_B,
    },
    Fixture {
        national_id: Some("6677889900112"),
        passport_id: None,
        first_name_th: Some("สุภาพ"),
        middle_name_th: None,
        last_name_th: Some("ใจดี"),
        first_name_en: "Supap",
        middle_name_en: None,
        last_name_en: "Jaidee",
        date_of_birth: (1991, 1, 22),
        phone_number: "0878901234",
        email: None,
        gender: "F",
        patient_hn: "HN011",
        hospital: HOSPITAL_B,
    },
];

impl Fixture {
    fn matches(&self, identifier: &str) -> bool {
        self.national_id == Some(identifier) || self.passport_id == Some(identifier)
    }

    fn to_record(&self) -> Option<PatientRecord> {
        let (year, month, day) = self.date_of_birth;
        Some(PatientRecord {
            national_id: self.national_id.map(str::to_string),
            passport_id: self.passport_id.map(str::to_string),
            first_name_th: self.first_name_th.map(str::to_string),
            middle_name_th: self.middle_name_th.map(str::to_string),
            last_name_th: self.last_name_th.map(str::to_string),
            first_name_en: Some(self.first_name_en.to_string()),
            middle_name_en: self.middle_name_en.map(str::to_string),
            last_name_en: Some(self.last_name_en.to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(year, month, day)?,
            phone_number: Some(self.phone_number.to_string()),
            email: self.email.map(str::to_string),
            gender: self.gender.to_string(),
            patient_hn: self.patient_hn.to_string(),
            hospital: self.hospital.to_string(),
            updated_at: None,
        })
    }
}

/// Find the sample patient whose national ID or passport ID equals `identifier`.
pub fn fixture_lookup(identifier: &str) -> Option<PatientRecord> {
    let identifier = identifier.trim();
    FIXTURES
        .iter()
        .find(|f| f.matches(identifier))
        .and_then(Fixture::to_record)
}

/// Every sample patient, in table order.
pub fn fixtures() -> Vec<PatientRecord> {
    FIXTURES.iter().filter_map(Fixture::to_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_eleven_valid_patients() {
        let all = fixtures();
        assert_eq!(all.len(), FIXTURES.len());
        assert_eq!(all.len(), 11);

        let keys: HashSet<_> = all
            .iter()
            .map(|r| (r.patient_hn.clone(), r.hospital.clone()))
            .collect();
        assert_eq!(keys.len(), 11, "(patient_hn, hospital) must be unique");
    }

    #[test]
    fn looks_up_by_national_id() {
        let record = fixture_lookup("9876543210987").expect("HN002 is a fixture");
        assert_eq!(record.patient_hn, "HN002");
        assert_eq!(record.hospital, "Hospital A");
        assert_eq!(record.first_name_en.as_deref(), Some("Somying"));
    }

    #[test]
    fn looks_up_by_passport_id() {
        let record = fixture_lookup("AB1234567").expect("HN003 is a fixture");
        assert_eq!(record.patient_hn, "HN003");
        assert_eq!(record.national_id, None);
        assert_eq!(record.middle_name_en.as_deref(), Some("William"));
    }

    #[test]
    fn hospital_b_patient() {
        let record = fixture_lookup("1111222233334").expect("HN004 is a fixture");
        assert_eq!(record.patient_hn, "HN004");
        assert_eq!(record.hospital, "Hospital B");
    }

    #[test]
    fn unknown_identifier_is_none() {
        assert!(fixture_lookup("9999999999999").is_none());
        assert!(fixture_lookup("").is_none());
    }
}
