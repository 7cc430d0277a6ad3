/// One point on the results chart: question number vs response time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsePoint {
    pub question: f64,
    pub secs: f64,
}

impl ResponsePoint {
    pub fn new(question: f64, secs: f64) -> Self {
        Self { question, secs }
    }
}

impl From<(f64, f64)> for ResponsePoint {
    fn from(v: (f64, f64)) -> Self {
        ResponsePoint {
            question: v.0,
            secs: v.1,
        }
    }
}

impl From<ResponsePoint> for (f64, f64) {
    fn from(p: ResponsePoint) -> Self {
        (p.question, p.secs)
    }
}
