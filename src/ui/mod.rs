/// egui rendering: filter widgets and the three charts.
pub mod panels;
pub mod plot;
