use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SURNAMES: [&str; 24] = [
    "Andersson", "Sage", "Skoog", "Carter", "Goodwin", "Johnson", "Panula", "Rice", "Asplund",
    "Fortune", "Brown", "Smith", "Harper", "Kelly", "Williams", "Baxter", "Allison", "Hart",
    "Davies", "Ford", "Moran", "Lefebre", "Palsson", "Graham",
];
const MALE_FIRST: [&str; 8] = ["John", "William", "Thomas", "Karl", "James", "Ernst", "Owen", "Harry"];
const FEMALE_FIRST: [&str; 8] = ["Mary", "Anna", "Elizabeth", "Margaret", "Laina", "Bertha", "Helen", "Alice"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One synthetic passenger, columns in file order.
struct Row {
    id: i64,
    survived: i64,
    pclass: i64,
    name: String,
    sex: &'static str,
    age: Option<f64>,
    sib_sp: i64,
    parch: i64,
    ticket: String,
    fare: f64,
    cabin: Option<String>,
    embarked: Option<&'static str>,
}

fn generate_row(id: i64, rng: &mut SimpleRng) -> Row {
    let pclass = match rng.next_f64() {
        r if r < 0.24 => 1,
        r if r < 0.45 => 2,
        _ => 3,
    };
    let female = rng.chance(0.35);
    let age = if rng.chance(0.2) {
        None
    } else {
        let mean = [38.0, 30.0, 25.0][pclass as usize - 1];
        Some((rng.gauss(mean, 14.0).clamp(0.42, 79.0) * 2.0).round() / 2.0)
    };

    // Women, children and first class fare best.
    let mut p: f64 = if female { 0.74 } else { 0.19 };
    p += [0.15, 0.0, -0.12][pclass as usize - 1];
    if age.is_some_and(|a| a < 10.0) {
        p += 0.2;
    }
    let survived = rng.chance(p.clamp(0.02, 0.98));

    let base_fare = [84.0, 20.0, 13.0][pclass as usize - 1];
    let fare = (rng.gauss(base_fare, base_fare * 0.6).max(0.0) * 10_000.0).round() / 10_000.0;
    let embarked = match rng.next_f64() {
        r if r < 0.003 => None,
        r if r < 0.19 => Some("C"),
        r if r < 0.28 => Some("Q"),
        _ => Some("S"),
    };

    let surname = rng.pick(&SURNAMES);
    let name = if female {
        format!("{surname}, Mrs. {}", rng.pick(&FEMALE_FIRST))
    } else {
        format!("{surname}, Mr. {}", rng.pick(&MALE_FIRST))
    };
    let cabin = (pclass == 1 && rng.chance(0.8))
        .then(|| format!("{}{}", ["A", "B", "C", "D", "E"][(id % 5) as usize], 10 + id % 90));

    Row {
        id,
        survived: survived as i64,
        pclass,
        name,
        sex: if female { "female" } else { "male" },
        age,
        sib_sp: (rng.next_u64() % 3) as i64,
        parch: (rng.next_u64() % 3) as i64,
        ticket: format!("{}", 100_000 + rng.next_u64() % 300_000),
        fare,
        cabin,
        embarked,
    }
}

fn write_csv(rows: &[Row], path: &str) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "PassengerId", "Survived", "Pclass", "Name", "Sex", "Age", "SibSp", "Parch", "Ticket",
        "Fare", "Cabin", "Embarked",
    ])?;
    for r in rows {
        writer.write_record([
            r.id.to_string(),
            r.survived.to_string(),
            r.pclass.to_string(),
            r.name.clone(),
            r.sex.to_string(),
            r.age.map(|a| a.to_string()).unwrap_or_default(),
            r.sib_sp.to_string(),
            r.parch.to_string(),
            r.ticket.clone(),
            r.fare.to_string(),
            r.cabin.clone().unwrap_or_default(),
            r.embarked.unwrap_or_default().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ints = |f: fn(&Row) -> i64| Arc::new(Int64Array::from_iter_values(rows.iter().map(f))) as ArrayRef;

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("PassengerId", ints(|r| r.id)),
        ("Survived", ints(|r| r.survived)),
        ("Pclass", ints(|r| r.pclass)),
        ("Name", Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))) as ArrayRef),
        ("Sex", Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex))) as ArrayRef),
        ("Age", Arc::new(rows.iter().map(|r| r.age).collect::<Float64Array>()) as ArrayRef),
        ("SibSp", ints(|r| r.sib_sp)),
        ("Parch", ints(|r| r.parch)),
        ("Ticket", Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.ticket.as_str()))) as ArrayRef),
        ("Fare", Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.fare))) as ArrayRef),
        ("Cabin", Arc::new(rows.iter().map(|r| r.cabin.as_deref()).collect::<StringArray>()) as ArrayRef),
        ("Embarked", Arc::new(rows.iter().map(|r| r.embarked).collect::<StringArray>()) as ArrayRef),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| {
                let nullable = matches!(array.data_type(), DataType::Float64 | DataType::Utf8);
                Field::new(*name, array.data_type().clone(), nullable)
            })
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(1912);
    let rows: Vec<Row> = (1..=891).map(|id| generate_row(id, &mut rng)).collect();

    write_csv(&rows, "sample_titanic.csv")?;
    write_parquet(&rows, "sample_titanic.parquet")?;

    let survivors = rows.iter().filter(|r| r.survived == 1).count();
    println!(
        "Wrote {} passengers ({survivors} survivors) to sample_titanic.csv and sample_titanic.parquet",
        rows.len()
    );
    Ok(())
}
