use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{GroupUpdate, NewExpense, NewGroup, NewMember, NewSettlement};
use crate::reminder::{Notifier, PaymentReminder};
use crate::schemas::{Currency, Group, GroupBook};
use crate::settings::AnalyticsSettings;
use crate::store::Store;

pub type SharedNotifier = dyn Notifier + Send + Sync;

type Response = Result<HttpResponse, LedgerError>;

#[derive(Deserialize)]
struct AnalyticsQuery {
    months: Option<u32>,
    top: Option<usize>,
}

#[derive(Serialize)]
struct Sent {
    success: bool,
}

#[derive(Serialize)]
struct CurrencyInfo {
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[get("/currencies")]
async fn list_currencies() -> HttpResponse {
    let currencies: Vec<CurrencyInfo> = Currency::ALL
        .into_iter()
        .map(|currency| CurrencyInfo {
            code: currency.code(),
            symbol: currency.symbol(),
            name: currency.name(),
        })
        .collect();
    HttpResponse::Ok().json(currencies)
}

#[get("/groups")]
async fn list_groups(store: web::Data<Store>) -> Response {
    let groups: Vec<Group> = store.list().await?.into_iter().map(|book| book.group).collect();
    Ok(HttpResponse::Ok().json(groups))
}

#[put("/groups/{id}")]
async fn add_group(store: web::Data<Store>, id: web::Path<String>, json: web::Json<NewGroup>) -> Response {
    let book = GroupBook::create(id.into_inner(), json.into_inner(), Utc::now());
    let book = store.insert(book).await?;
    tracing::info!(group_id = book.id(), "group added");
    Ok(HttpResponse::Created().json(book.group))
}

#[get("/groups/{id}")]
async fn get_group(store: web::Data<Store>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(store.get(&id).await?.group))
}

#[patch("/groups/{id}")]
async fn update_group(
    store: web::Data<Store>,
    id: web::Path<String>,
    json: web::Json<GroupUpdate>,
) -> Response {
    let update = json.into_inner();
    let group = store
        .update(&id, |book| {
            book.update_details(update, Utc::now());
            Ok(book.group.clone())
        })
        .await?;
    Ok(HttpResponse::Ok().json(group))
}

#[delete("/groups/{id}")]
async fn delete_group(store: web::Data<Store>, id: web::Path<String>) -> Response {
    store.delete(&id).await?;
    tracing::info!(group_id = %id, "group deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[post("/groups/{id}/members")]
async fn add_member(store: web::Data<Store>, id: web::Path<String>, json: web::Json<NewMember>) -> Response {
    let new = json.into_inner();
    let member = store
        .update(&id, |book| Ok(book.add_member(new, Utc::now())))
        .await?;
    Ok(HttpResponse::Created().json(member))
}

#[delete("/groups/{id}/members/{member_id}")]
async fn remove_member(store: web::Data<Store>, path: web::Path<(String, String)>) -> Response {
    let (id, member_id) = path.into_inner();
    let member = store
        .update(&id, |book| book.remove_member(&member_id, Utc::now()))
        .await?;
    Ok(HttpResponse::Ok().json(member))
}

#[get("/groups/{id}/expenses")]
async fn list_expenses(store: web::Data<Store>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(store.get(&id).await?.expenses))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(store: web::Data<Store>, id: web::Path<String>, json: web::Json<NewExpense>) -> Response {
    let new = json.into_inner();
    let expense = store
        .update(&id, |book| book.add_expense(new, Utc::now()))
        .await?;
    tracing::info!(group_id = %id, expense_id = %expense.id, amount = %expense.amount, "expense added");
    Ok(HttpResponse::Created().json(expense))
}

#[put("/groups/{id}/expenses/{expense_id}")]
async fn update_expense(
    store: web::Data<Store>,
    path: web::Path<(String, String)>,
    json: web::Json<NewExpense>,
) -> Response {
    let (id, expense_id) = path.into_inner();
    let new = json.into_inner();
    let expense = store
        .update(&id, |book| book.update_expense(&expense_id, new))
        .await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[delete("/groups/{id}/expenses/{expense_id}")]
async fn delete_expense(store: web::Data<Store>, path: web::Path<(String, String)>) -> Response {
    let (id, expense_id) = path.into_inner();
    store
        .update(&id, |book| book.remove_expense(&expense_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/groups/{id}/balance")]
async fn get_balance(store: web::Data<Store>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(store.get(&id).await?.balances()))
}

#[get("/groups/{id}/settlements/suggested")]
async fn suggested_settlements(store: web::Data<Store>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(store.get(&id).await?.suggested_settlements()))
}

#[get("/groups/{id}/settlements")]
async fn list_settlements(store: web::Data<Store>, id: web::Path<String>) -> Response {
    Ok(HttpResponse::Ok().json(store.get(&id).await?.settlements))
}

#[post("/groups/{id}/settlements")]
async fn record_settlement(
    store: web::Data<Store>,
    id: web::Path<String>,
    json: web::Json<NewSettlement>,
) -> Response {
    let new = json.into_inner();
    let settlement = store
        .update(&id, |book| book.record_settlement(new, Utc::now()))
        .await?;
    tracing::info!(group_id = %id, settlement_id = %settlement.id, "settlement recorded");
    Ok(HttpResponse::Created().json(settlement))
}

#[post("/groups/{id}/settlements/{settlement_id}/complete")]
async fn complete_settlement(store: web::Data<Store>, path: web::Path<(String, String)>) -> Response {
    let (id, settlement_id) = path.into_inner();
    let settlement = store
        .update(&id, |book| book.complete_settlement(&settlement_id, Utc::now()))
        .await?;
    tracing::info!(group_id = %id, settlement_id = %settlement.id, "settlement completed");
    Ok(HttpResponse::Ok().json(settlement))
}

#[post("/groups/{id}/settlements/{settlement_id}/cancel")]
async fn cancel_settlement(store: web::Data<Store>, path: web::Path<(String, String)>) -> Response {
    let (id, settlement_id) = path.into_inner();
    let settlement = store
        .update(&id, |book| book.cancel_settlement(&settlement_id))
        .await?;
    tracing::info!(group_id = %id, settlement_id = %settlement.id, "settlement cancelled");
    Ok(HttpResponse::Ok().json(settlement))
}

#[post("/groups/{id}/settlements/{settlement_id}/remind")]
async fn remind_settlement(
    store: web::Data<Store>,
    notifier: web::Data<SharedNotifier>,
    path: web::Path<(String, String)>,
) -> Response {
    let (id, settlement_id) = path.into_inner();
    let reminder = store
        .update(&id, |book| {
            let reminder = book.reminder_for(&settlement_id)?;
            notifier.send(&reminder)?;
            Ok(reminder)
        })
        .await?;
    Ok(HttpResponse::Ok().json(reminder))
}

#[get("/groups/{id}/analytics")]
async fn get_analytics(
    store: web::Data<Store>,
    defaults: web::Data<AnalyticsSettings>,
    id: web::Path<String>,
    query: web::Query<AnalyticsQuery>,
) -> Response {
    let book = store.get(&id).await?;
    let analytics = book.analytics(
        Utc::now().date_naive(),
        query.months.unwrap_or(defaults.months),
        query.top.unwrap_or(defaults.top_spenders),
    )?;
    Ok(HttpResponse::Ok().json(analytics))
}

#[post("/reminders/send")]
async fn send_reminder(notifier: web::Data<SharedNotifier>, json: web::Json<PaymentReminder>) -> Response {
    notifier.send(&json)?;
    Ok(HttpResponse::Ok().json(Sent { success: true }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_currencies)
        .service(list_groups)
        .service(add_group)
        .service(get_group)
        .service(update_group)
        .service(delete_group)
        .service(add_member)
        .service(remove_member)
        .service(list_expenses)
        .service(add_expense)
        .service(update_expense)
        .service(delete_expense)
        .service(get_balance)
        .service(suggested_settlements)
        .service(list_settlements)
        .service(record_settlement)
        .service(complete_settlement)
        .service(cancel_settlement)
        .service(remind_settlement)
        .service(get_analytics)
        .service(send_reminder);
}
