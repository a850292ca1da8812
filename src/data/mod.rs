/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PassengerDataset (fatal on bad schema)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ PassengerDataset  │  Vec<Passenger>, observed bounds, immutable
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterParams predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  FilteredView → summary tables
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod test_support {
    use super::model::{Passenger, PassengerDataset, Pclass, Port, Sex};

    pub fn passenger(
        id: u32,
        survived: bool,
        pclass: Pclass,
        sex: Sex,
        age: Option<f64>,
        fare: f64,
        embarked: Option<Port>,
    ) -> Passenger {
        Passenger {
            id,
            survived,
            pclass,
            name: format!("Family{id}, Mr. Test"),
            sex,
            age,
            sib_sp: 0,
            parch: 0,
            ticket: format!("T{id}"),
            fare,
            cabin: None,
            embarked,
        }
    }

    pub fn named(mut p: Passenger, name: &str) -> Passenger {
        p.name = name.to_string();
        p
    }

    /// Twelve passengers covering every class, both sexes, all ports, a
    /// missing port and missing ages.
    pub fn sample_dataset() -> PassengerDataset {
        use Pclass::*;
        use Port::*;
        use Sex::*;
        PassengerDataset::from_passengers(vec![
            named(passenger(1, false, Third, Male, Some(22.0), 7.25, Some(S)), "Braund, Mr. Owen Harris"),
            named(passenger(2, true, First, Female, Some(38.0), 71.2833, Some(C)), "Cumings, Mrs. John Bradley"),
            named(passenger(3, true, Third, Female, Some(26.0), 7.925, Some(S)), "Heikkinen, Miss. Laina"),
            named(passenger(4, true, First, Female, Some(35.0), 53.1, Some(S)), "Futrelle, Mrs. Jacques Heath"),
            named(passenger(5, false, Third, Male, Some(35.0), 8.05, Some(S)), "Allen, Mr. William Henry"),
            named(passenger(6, false, Third, Male, None, 8.4583, Some(Q)), "Moran, Mr. James"),
            named(passenger(7, false, First, Male, Some(54.0), 51.8625, Some(S)), "McCarthy, Mr. Timothy J"),
            named(passenger(8, false, Third, Male, Some(2.0), 21.075, Some(S)), "Palsson, Master. Gosta Leonard"),
            named(passenger(9, true, Third, Female, Some(27.0), 11.1333, Some(S)), "Johnson, Mrs. Oscar W"),
            named(passenger(10, true, Second, Female, Some(14.0), 30.0708, Some(C)), "Nasser, Mrs. Nicholas"),
            named(passenger(11, true, First, Female, Some(62.0), 80.0, None), "Stone, Mrs. George Nelson"),
            named(passenger(12, true, Second, Male, None, 13.0, Some(S)), "Futrelle, Master. Test"),
        ])
    }
}
