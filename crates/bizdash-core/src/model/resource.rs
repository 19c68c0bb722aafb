// ── Business resources ──
//
// The five REST collections the dashboard manages, with their endpoints,
// table columns and form field lists.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::field::{FieldDescriptor, Widget};

/// A table column: record field plus header title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub title: &'static str,
}

/// One REST collection exposed by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Employees,
    Projects,
    Customers,
    Transactions,
    Assets,
}

impl Resource {
    /// Collection endpoint path, always with a trailing slash.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Employees => "/employees/",
            Self::Projects => "/projects/",
            Self::Customers => "/customers/",
            Self::Transactions => "/transactions/",
            Self::Assets => "/assets/",
        }
    }

    /// Page title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Employees => "Employees",
            Self::Projects => "Projects",
            Self::Customers => "Customers",
            Self::Transactions => "Finance",
            Self::Assets => "Assets",
        }
    }

    /// Noun used in the create/update modal title.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Employees => "employee",
            Self::Projects => "project",
            Self::Customers => "customer",
            Self::Transactions => "transaction",
            Self::Assets => "asset",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::Employees => &[
                Column {
                    field: "name",
                    title: "Name",
                },
                Column {
                    field: "email",
                    title: "Email",
                },
                Column {
                    field: "position",
                    title: "Position",
                },
                Column {
                    field: "department",
                    title: "Department",
                },
            ],
            Self::Projects => &[
                Column {
                    field: "name",
                    title: "Name",
                },
                Column {
                    field: "client",
                    title: "Client",
                },
                Column {
                    field: "status",
                    title: "Status",
                },
                Column {
                    field: "start_date",
                    title: "Start Date",
                },
                Column {
                    field: "end_date",
                    title: "End Date",
                },
                Column {
                    field: "progress",
                    title: "Progress",
                },
            ],
            Self::Customers => &[
                Column {
                    field: "name",
                    title: "Name",
                },
                Column {
                    field: "email",
                    title: "Email",
                },
                Column {
                    field: "phone",
                    title: "Phone",
                },
                Column {
                    field: "company",
                    title: "Company",
                },
                Column {
                    field: "status",
                    title: "Status",
                },
            ],
            Self::Transactions => &[
                Column {
                    field: "date",
                    title: "Date",
                },
                Column {
                    field: "description",
                    title: "Description",
                },
                Column {
                    field: "amount",
                    title: "Amount",
                },
                Column {
                    field: "type",
                    title: "Type",
                },
                Column {
                    field: "category",
                    title: "Category",
                },
            ],
            Self::Assets => &[
                Column {
                    field: "name",
                    title: "Name",
                },
                Column {
                    field: "category",
                    title: "Category",
                },
                Column {
                    field: "value",
                    title: "Value",
                },
                Column {
                    field: "status",
                    title: "Status",
                },
                Column {
                    field: "location",
                    title: "Location",
                },
            ],
        }
    }

    /// Editable fields, in form order.
    pub fn fields(self) -> Vec<FieldDescriptor> {
        match self {
            Self::Employees => vec![
                FieldDescriptor::new("name", "Name", Widget::Text).required(),
                FieldDescriptor::new("email", "Email", Widget::Email).required(),
                FieldDescriptor::new(
                    "position",
                    "Position",
                    Widget::select(&[
                        "Developer",
                        "Senior Developer",
                        "Team Lead",
                        "Manager",
                        "Director",
                        "HR Specialist",
                        "Accountant",
                        "Marketing Specialist",
                        "Sales Representative",
                    ]),
                )
                .required(),
                FieldDescriptor::new(
                    "department",
                    "Department",
                    Widget::select(&["IT", "HR", "Finance", "Marketing", "Sales"]),
                )
                .required(),
            ],
            Self::Projects => vec![
                FieldDescriptor::new("name", "Name", Widget::Text).required(),
                FieldDescriptor::new("description", "Description", Widget::TextArea),
                FieldDescriptor::new("client", "Client", Widget::Text).required(),
                FieldDescriptor::new(
                    "status",
                    "Status",
                    Widget::choices(&[
                        ("planning", "Planning"),
                        ("active", "Active"),
                        ("completed", "Completed"),
                        ("cancelled", "Cancelled"),
                    ]),
                )
                .required(),
                FieldDescriptor::new("start_date", "Start date", Widget::Date),
                FieldDescriptor::new("end_date", "End date", Widget::Date),
                FieldDescriptor::new(
                    "progress",
                    "Progress",
                    Widget::Number {
                        min: Some(0.0),
                        max: Some(100.0),
                    },
                ),
            ],
            Self::Customers => vec![
                FieldDescriptor::new("name", "Name", Widget::Text).required(),
                FieldDescriptor::new("email", "Email", Widget::Email).required(),
                FieldDescriptor::new("phone", "Phone", Widget::Text),
                FieldDescriptor::new("company", "Company", Widget::Text),
                FieldDescriptor::new(
                    "status",
                    "Status",
                    Widget::choices(&[
                        ("lead", "Lead"),
                        ("prospect", "Prospect"),
                        ("customer", "Customer"),
                        ("inactive", "Inactive"),
                    ]),
                )
                .required(),
            ],
            Self::Transactions => vec![
                FieldDescriptor::new("date", "Date", Widget::Date).required(),
                FieldDescriptor::new("description", "Description", Widget::Text).required(),
                FieldDescriptor::new("amount", "Amount", Widget::number()).required(),
                FieldDescriptor::new(
                    "type",
                    "Type",
                    Widget::choices(&[("income", "Income"), ("expense", "Expense")]),
                )
                .required(),
                FieldDescriptor::new("category", "Category", Widget::Text).required(),
            ],
            Self::Assets => vec![
                FieldDescriptor::new("name", "Name", Widget::Text).required(),
                FieldDescriptor::new("description", "Description", Widget::TextArea),
                FieldDescriptor::new(
                    "category",
                    "Category",
                    Widget::choices(&[
                        ("equipment", "Equipment"),
                        ("furniture", "Furniture"),
                        ("vehicle", "Vehicle"),
                        ("software", "Software"),
                        ("other", "Other"),
                    ]),
                )
                .required(),
                FieldDescriptor::new("value", "Value", Widget::number()).required(),
                FieldDescriptor::new(
                    "status",
                    "Status",
                    Widget::choices(&[
                        ("active", "Active"),
                        ("maintenance", "Maintenance"),
                        ("retired", "Retired"),
                        ("disposed", "Disposed"),
                    ]),
                )
                .required(),
                FieldDescriptor::new("location", "Location", Widget::Text),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn endpoints_are_slash_terminated() {
        for resource in Resource::iter() {
            let ep = resource.endpoint();
            assert!(ep.starts_with('/') && ep.ends_with('/'), "{ep}");
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Employees".parse::<Resource>().unwrap(), Resource::Employees);
        assert_eq!(Resource::Assets.to_string(), "assets");
    }

    #[test]
    fn every_column_is_backed_by_a_field() {
        for resource in Resource::iter() {
            let fields = resource.fields();
            for column in resource.columns() {
                assert!(
                    fields.iter().any(|f| f.name == column.field),
                    "{resource}: column {} has no field",
                    column.field
                );
            }
        }
    }

    #[test]
    fn columns_are_static_tables() {
        let columns: &'static [Column] = Resource::Employees.columns();
        assert_eq!(
            columns.first(),
            Some(&Column {
                field: "name",
                title: "Name"
            })
        );
        assert_eq!(Resource::Projects.columns().len(), 6);
        assert_eq!(Resource::Transactions.columns()[0].field, "date");
        assert!(Resource::iter().all(|r| !r.columns().is_empty()));
    }

    #[test]
    fn employee_position_options() {
        let fields = Resource::Employees.fields();
        let position = fields.iter().find(|f| f.name == "position").unwrap();
        assert_eq!(position.options().len(), 9);
        assert!(position.is_required());
    }
}
