use chrono::NaiveDate;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use launch_atlas::analytics::*;
use launch_atlas::model::{Column, LaunchRecord};
use launch_atlas::store::{Dataset, LoadOptions, read_records};
use std::hint::black_box;

const COMPANIES: [&str; 8] = [
    "RVSN USSR", "Arianespace", "CASC", "General Dynamics", "NASA", "VKS RF", "US Air Force", "ULA",
];
const ROCKETS: [&str; 5] = ["Cosmos-3M", "Voskhod", "Ariane 5 ECA", "Long March 2C", "Atlas V"];
const STATUSES: [&str; 4] = ["Success", "Failure", "Partial Failure", "Prelaunch Failure"];

fn sample_record(i: usize) -> LaunchRecord {
    let year = 1957 + (i % 64) as i32;
    let month = (i % 12) as u32 + 1;
    let day = (i % 28) as u32 + 1;
    LaunchRecord {
        company: COMPANIES[i % COMPANIES.len()].into(),
        location: format!("Pad {}, Site {}, Kazakhstan", i % 7, i % 3),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        time: Some(format!("{:02}:{:02}", i % 24, i % 60)),
        rocket: ROCKETS[i % ROCKETS.len()].into(),
        mission: format!("Mission {i}"),
        rocket_status: "Retired".into(),
        price: (i % 4 == 0).then_some(45.0),
        mission_status: STATUSES[(i / 7) % STATUSES.len()].into(),
    }
}

fn sample_dataset(n: usize) -> Dataset {
    Dataset::from_records((0..n).map(sample_record).collect())
}

fn sample_csv(n: usize) -> String {
    let mut out =
        String::from("Company,Location,Date,Time,Rocket,Mission,RocketStatus,Price,MissionStatus\n");
    for r in (0..n).map(sample_record) {
        out.push_str(&format!(
            "{},\"{}\",{},{},{},{},{},{},{}\n",
            r.company,
            r.location,
            r.date,
            r.time.unwrap_or_default(),
            r.rocket,
            r.mission,
            r.rocket_status,
            r.price.map(|p| p.to_string()).unwrap_or_default(),
            r.mission_status,
        ));
    }
    out
}

fn bench_load(c: &mut Criterion) {
    let text = sample_csv(4_500);
    c.bench_function("read_records_4500", |b| {
        b.iter_batched(
            || text.as_bytes(),
            |bytes| {
                let (records, report) = read_records(bytes, &LoadOptions::default()).unwrap();
                black_box((records.len(), report.rows_read));
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_queries(c: &mut Criterion) {
    let ds = sample_dataset(4_500);

    c.bench_function("mission_count_by_company", |b| {
        b.iter(|| black_box(mission_count_by_company(&ds, black_box("NASA"))))
    });
    c.bench_function("missions_by_date_range", |b| {
        b.iter(|| black_box(missions_by_date_range(&ds, "1970-01-01", "1990-12-31").len()))
    });
    c.bench_function("top_companies_by_mission_count", |b| {
        b.iter(|| black_box(top_companies_by_mission_count(&ds, black_box(5))))
    });
    c.bench_function("mission_status_count", |b| {
        b.iter(|| black_box(mission_status_count(&ds).len()))
    });
    c.bench_function("company_activity", |b| {
        b.iter(|| black_box(company_activity(&ds, 20).rows.len()))
    });
    c.bench_function("histogram_time", |b| {
        b.iter(|| black_box(histogram(&ds, Column::Time, 0).unwrap().total()))
    });
}

criterion_group!(query_perf, bench_load, bench_queries);
criterion_main!(query_perf);
