//! Per-resource request planners. Dispatch is a two-level lookup: the
//! item's `resource` field selects a module, the module's operation enum
//! selects a planner, and the planner deserializes the item into its
//! typed parameter struct before shaping the request.

mod about;
mod accounts;
mod available_budgets;
mod bills;
mod budgets;
mod categories;
mod general;
mod object_groups;
pub(crate) mod params;
mod piggy_banks;
mod recurrences;
mod rules;
mod tags;
mod transactions;

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tabwriter::TabWriter;
use thiserror::Error;

use firefly_api::ApiRequest;

use crate::item::Item;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("{0}")]
    Precondition(String),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error("unsupported operation: {0}")]
    UnknownOperation(String),
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] serde_json::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.to_string() == other.to_string()
    }
}

/// How the response of a planned request is handled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResponseKind {
    Json,
    Download { fallback_name: &'static str },
}

/// A fully-shaped request plus its response handling mode. Planners are
/// pure; nothing here has touched the network yet.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Plan {
    pub(crate) request: ApiRequest,
    pub(crate) response: ResponseKind,
}

impl Plan {
    pub(crate) fn json(request: ApiRequest) -> Self {
        Self {
            request,
            response: ResponseKind::Json,
        }
    }

    pub(crate) fn download(request: ApiRequest, fallback_name: &'static str) -> Self {
        Self {
            request,
            response: ResponseKind::Download { fallback_name },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Resource {
    General,
    About,
    Accounts,
    Bills,
    Budgets,
    Transactions,
    Categories,
    Tags,
    RulesAndGroups,
    PiggyBanks,
    AvailableBudgets,
    ObjectGroups,
    Recurrences,
}

/// Builds the request plan for one item.
pub(crate) fn plan(item: &Item) -> Result<Plan, Error> {
    let name = item.resource().unwrap_or_default();
    let resource = parse_selector::<Resource>(name)
        .ok_or_else(|| Error::UnknownResource(name.to_string()))?;

    match resource {
        Resource::General => general::plan(item),
        Resource::About => about::plan(item),
        Resource::Accounts => accounts::plan(item),
        Resource::Bills => bills::plan(item),
        Resource::Budgets => budgets::plan(item),
        Resource::Transactions => transactions::plan(item),
        Resource::Categories => categories::plan(item),
        Resource::Tags => tags::plan(item),
        Resource::RulesAndGroups => rules::plan(item),
        Resource::PiggyBanks => piggy_banks::plan(item),
        Resource::AvailableBudgets => available_budgets::plan(item),
        Resource::ObjectGroups => object_groups::plan(item),
        Resource::Recurrences => recurrences::plan(item),
    }
}

/// Parses the item's operation name into a resource module's operation
/// enum.
fn operation<T: DeserializeOwned>(item: &Item) -> Result<T, Error> {
    let name = item.operation().unwrap_or_default();
    parse_selector(name).ok_or_else(|| Error::UnknownOperation(name.to_string()))
}

fn parse_selector<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(Value::String(name.to_string())).ok()
}

const OPERATIONS: &[(&str, &[&str])] = &[
    ("general", &["searchAll", "getInsights", "exportData"]),
    ("about", &["getSystemInfo", "getUserInfo", "runCronJobs"]),
    (
        "accounts",
        &[
            "listAccounts",
            "getAccount",
            "createAccount",
            "updateAccount",
            "deleteAccount",
            "getTransactions",
            "getAttachments",
            "getPiggyBanks",
        ],
    ),
    (
        "bills",
        &[
            "listBills",
            "getBill",
            "createBill",
            "updateBill",
            "deleteBill",
            "getAttachments",
            "getRules",
            "getTransactions",
        ],
    ),
    (
        "budgets",
        &[
            "listBudgets",
            "getBudget",
            "createBudget",
            "updateBudget",
            "deleteBudget",
            "listBudgetLimits",
            "createBudgetLimit",
            "getBudgetLimit",
            "updateBudgetLimit",
            "deleteBudgetLimit",
            "getTransactions",
            "getAttachments",
            "getLimitTransactions",
            "listAllBudgetLimits",
            "getTransactionsWithoutBudget",
        ],
    ),
    (
        "transactions",
        &[
            "listTransactions",
            "getTransaction",
            "createTransaction",
            "updateTransaction",
            "deleteTransaction",
            "getAttachments",
            "getPiggyBankEvents",
            "listTransactionLinks",
            "getTransactionJournal",
            "deleteTransactionSplit",
        ],
    ),
    (
        "categories",
        &[
            "listCategories",
            "createCategory",
            "getCategory",
            "updateCategory",
            "deleteCategory",
            "getTransactionsByCategory",
        ],
    ),
    (
        "tags",
        &[
            "listTags",
            "createTag",
            "getTag",
            "updateTag",
            "deleteTag",
            "getTransactionsByTag",
        ],
    ),
    (
        "rulesAndGroups",
        &[
            "listGroups",
            "getGroup",
            "listGroupRules",
            "testGroup",
            "triggerGroup",
            "listRules",
            "getRule",
            "testRule",
            "triggerRule",
        ],
    ),
    (
        "piggyBanks",
        &[
            "listPiggyBanks",
            "getPiggyBank",
            "createPiggyBank",
            "updatePiggyBank",
            "deletePiggyBank",
            "getEvents",
            "getAttachments",
        ],
    ),
    (
        "availableBudgets",
        &["listAvailableBudgets", "getAvailableBudget"],
    ),
    (
        "objectGroups",
        &[
            "listObjectGroups",
            "getObjectGroup",
            "updateObjectGroup",
            "deleteObjectGroup",
            "getBills",
            "getPiggyBanks",
        ],
    ),
    (
        "recurrences",
        &[
            "listRecurrences",
            "getRecurrence",
            "createRecurrence",
            "updateRecurrence",
            "deleteRecurrence",
            "triggerRecurrence",
        ],
    ),
];

pub(crate) fn operations_table() -> anyhow::Result<String> {
    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "Resource\tOperation")?;

    for (resource, operations) in OPERATIONS {
        for operation in *operations {
            writeln!(tw, "{}\t{}", resource, operation)?;
        }
    }

    Ok(String::from_utf8(tw.into_inner()?)?)
}
