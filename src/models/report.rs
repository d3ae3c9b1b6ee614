/// A vehicle sale report. Created unapproved; only an admin approval flips
/// `approved`, and only approved reports feed the price estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: i32,
    pub price: i32,
    pub approved: bool,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
    pub user_id: i32,
}

/// Field set for submitting a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub price: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
}

/// Parameters for a price estimate lookup.
#[derive(Debug, Clone)]
pub struct EstimateQuery {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub lat: i32,
    pub lon: i32,
    pub mileage: i32,
}
