use tabled::Tabled;

#[derive(Tabled)]
pub struct CounterRow {
    pub counter: &'static str,
    pub min: u64,
    pub max: u64,
    pub last: u64,
}
