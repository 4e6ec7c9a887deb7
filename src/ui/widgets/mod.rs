mod card;

pub use card::EmployeeCardWidget;
