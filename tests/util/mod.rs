use std::path::PathBuf;
use tempfile::TempDir;

/// Header row of a well-formed launch table.
#[allow(dead_code)]
pub const HEADER: &str =
    "Company,Location,Date,Time,Rocket,Mission,RocketStatus,Price,MissionStatus";

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// One row of a fixture table; unset fields get plausible defaults.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct Row {
    pub company: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub rocket: String,
    pub mission: String,
    pub rocket_status: String,
    pub price: String,
    pub mission_status: String,
}

#[allow(dead_code)]
impl Row {
    pub fn new(company: &str, date: &str, mission: &str) -> Self {
        Self {
            company: company.to_string(),
            location: "LC-39A, Kennedy Space Center, Florida, USA".to_string(),
            date: date.to_string(),
            time: "12:00".to_string(),
            rocket: "Falcon 9".to_string(),
            mission: mission.to_string(),
            rocket_status: "Active".to_string(),
            price: String::new(),
            mission_status: "Success".to_string(),
        }
    }

    pub fn rocket(mut self, rocket: &str) -> Self {
        self.rocket = rocket.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.mission_status = status.to_string();
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    fn to_line(&self) -> String {
        [
            &self.company,
            &self.location,
            &self.date,
            &self.time,
            &self.rocket,
            &self.mission,
            &self.rocket_status,
            &self.price,
            &self.mission_status,
        ]
        .iter()
        .map(|field| quote(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Temp directory holding fixture launch tables.
#[allow(dead_code)]
pub struct LaunchFixture {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl LaunchFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write raw text and return its path.
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Write a well-formed table and return its path.
    pub fn write_rows(&self, name: &str, rows: &[Row]) -> PathBuf {
        let mut contents = String::from(HEADER);
        for row in rows {
            contents.push('\n');
            contents.push_str(&row.to_line());
        }
        contents.push('\n');
        self.write_raw(name, &contents)
    }
}

/// 185 launches: NASA 100, SpaceX 50, RVSN USSR 25, plus 10 spread thinly.
///
/// NASA launches fly in 2020 and 2021 (50 each); statuses are
/// Success 100, Failure 50, Partial Failure 25, Prelaunch Failure 10.
#[allow(dead_code)]
pub fn scenario_rows() -> Vec<Row> {
    let mut rows = Vec::with_capacity(185);
    for i in 0..100 {
        let year = if i < 50 { 2020 } else { 2021 };
        rows.push(
            Row::new("NASA", &format!("{year}-03-{:02}", i % 28 + 1), &format!("NASA-{i}"))
                .rocket("Saturn V"),
        );
    }
    for i in 0..50 {
        rows.push(
            Row::new("SpaceX", &format!("2015-{:02}-10", i % 12 + 1), &format!("SpaceX-{i}"))
                .status("Failure"),
        );
    }
    for i in 0..25 {
        rows.push(
            Row::new("RVSN USSR", &format!("1965-{:02}-01", i % 12 + 1), &format!("USSR-{i}"))
                .rocket("Vostok")
                .location("Site 1/5, Baikonur Cosmodrome, Kazakhstan")
                .status("Partial Failure"),
        );
    }
    for i in 0..10 {
        rows.push(
            Row::new(&format!("Minor {i}"), "1999-01-01", &format!("Minor-{i}"))
                .rocket("Atlas")
                .status("Prelaunch Failure"),
        );
    }
    rows
}
