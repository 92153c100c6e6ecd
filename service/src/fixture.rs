//! Fixtures for [`Service`] tests over the [`Memory`] database.

use std::sync::Arc;

use common::{clock::FixedClock, Area, Date, Money};
use tracerr::Traced;

use crate::{
    command::{
        create_contract, CreateContract, CreatePremises, CreateTenant,
        CreateUnit, RecordExpense, RecordIncome,
    },
    domain::{
        contract, expense, income, loan, premises, tenant, unit, user,
        Contract, Expense, Income, Premises, Tenant, Unit,
    },
    infra::database::Memory,
    Command as _, Config, Service,
};

/// [`Service`] under test.
pub(crate) type TestService = Service<Memory, Arc<FixedClock>>;

/// Creates a new empty [`TestService`] frozen at the provided `today`.
pub(crate) fn service(today: &str) -> (TestService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at(date(today)));
    let svc = Service::new(Config::default(), Memory::new())
        .with_clock(Arc::clone(&clock));
    (svc, clock)
}

/// Parses the provided ISO [`Date`].
pub(crate) fn date(s: &str) -> Date {
    s.parse().unwrap()
}

/// Parses the provided [`Money`] amount.
pub(crate) fn money(s: &str) -> Money {
    s.parse().unwrap()
}

/// Returns the ID of the user performing mutations in tests.
pub(crate) fn actor() -> user::Id {
    user::Id::default()
}

/// Creates new [`Premises`].
pub(crate) async fn premises(svc: &TestService, name: &str) -> Premises {
    svc.execute(CreatePremises {
        initiator_id: actor(),
        name: premises::Name::new(name).unwrap(),
        address: None,
    })
    .await
    .unwrap()
}

/// Creates a new [`Unit`] in the provided [`Premises`].
pub(crate) async fn unit(
    svc: &TestService,
    premises_id: premises::Id,
    code: &str,
) -> Unit {
    svc.execute(CreateUnit {
        initiator_id: actor(),
        premises_id,
        code: unit::Code::new(code).unwrap(),
        price: money("100"),
        area: "12.5".parse::<Area>().unwrap(),
    })
    .await
    .unwrap()
}

/// Creates a new [`Tenant`].
pub(crate) async fn tenant(svc: &TestService, name: &str) -> Tenant {
    svc.execute(CreateTenant {
        initiator_id: actor(),
        name: tenant::Name::new(name).unwrap(),
        document: None,
        email: None,
        phone: None,
    })
    .await
    .unwrap()
}

/// Tries to book the provided [`Unit`] for the given dates.
pub(crate) async fn book(
    svc: &TestService,
    unit_id: unit::Id,
    tenant_id: tenant::Id,
    start: &str,
    end: Option<&str>,
) -> Result<Contract, Traced<create_contract::ExecutionError>> {
    svc.execute(CreateContract {
        initiator_id: actor(),
        unit_id,
        tenant_id,
        start: date(start),
        end: end.map(date),
        price: money("100"),
        deposit: None,
        deposit_paid: false,
    })
    .await
}

/// Seeds a single [`Unit`] of new [`Premises`] and a [`Tenant`].
pub(crate) async fn seed(svc: &TestService) -> (Premises, Unit, Tenant) {
    let premises = premises(svc, "Depot").await;
    let unit = unit(svc, premises.id, "A-1").await;
    let tenant = tenant(svc, "John Doe").await;
    (premises, unit, tenant)
}

/// Records a rent [`Income`] of the provided [`Contract`].
pub(crate) async fn income(
    svc: &TestService,
    contract_id: contract::Id,
    amount: &str,
    paid_on: &str,
) -> Income {
    svc.execute(RecordIncome {
        initiator_id: actor(),
        contract_id,
        amount: money(amount),
        paid_on: date(paid_on),
        category: income::Category::Rent,
        method: None,
        description: None,
    })
    .await
    .unwrap()
}

/// Records an [`Expense`] of the provided [`Premises`], repaying the
/// provided [`Loan`] if any.
///
/// [`Loan`]: crate::domain::Loan
pub(crate) async fn expense(
    svc: &TestService,
    premises_id: premises::Id,
    loan_id: Option<loan::Id>,
    amount: &str,
    spent_on: &str,
) -> Expense {
    svc.execute(RecordExpense {
        initiator_id: actor(),
        premises_id,
        loan_id,
        amount: money(amount),
        spent_on: date(spent_on),
        category: if loan_id.is_some() {
            expense::Category::LoanPayment
        } else {
            expense::Category::Maintenance
        },
        method: None,
        description: None,
    })
    .await
    .unwrap()
}
