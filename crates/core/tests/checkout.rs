//! Checkout pipeline tests against in-memory store fakes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;

use atelier_core::cart::CartLine;
use atelier_core::checkout::{
    CheckoutError, CheckoutPipeline, CheckoutRequest, OrderDraft, OrderStore, ProductInfo,
    ProductStore,
};
use atelier_core::error::CoreError;
use atelier_core::types::DbId;

struct FakeProducts {
    products: HashMap<DbId, ProductInfo>,
}

impl FakeProducts {
    fn with(products: Vec<ProductInfo>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

#[async_trait]
impl ProductStore for FakeProducts {
    async fn get_product(&self, id: DbId) -> Result<Option<ProductInfo>, CoreError> {
        Ok(self.products.get(&id).cloned())
    }
}

/// Snapshot of a committed draft, for assertions.
#[derive(Debug, Clone)]
struct CommittedOrder {
    user_id: DbId,
    total_amount: f64,
    payment_method: String,
    line_prices: Vec<f64>,
    city: String,
}

#[derive(Default)]
struct RecordingOrders {
    committed: Mutex<Vec<CommittedOrder>>,
}

impl RecordingOrders {
    fn committed(&self) -> Vec<CommittedOrder> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderStore for RecordingOrders {
    async fn create_order(&self, draft: &OrderDraft) -> Result<DbId, CoreError> {
        let mut committed = self.committed.lock().unwrap();
        committed.push(CommittedOrder {
            user_id: draft.user_id,
            total_amount: draft.total_amount,
            payment_method: draft.payment_method.clone(),
            line_prices: draft.lines.iter().map(|l| l.price).collect(),
            city: draft.address.city.clone(),
        });
        Ok(committed.len() as DbId)
    }
}

/// Always fails the transactional commit.
struct FailingOrders;

#[async_trait]
impl OrderStore for FailingOrders {
    async fn create_order(&self, _draft: &OrderDraft) -> Result<DbId, CoreError> {
        Err(CoreError::Internal("deadlock detected".into()))
    }
}

fn product(id: DbId, price: f64) -> ProductInfo {
    ProductInfo {
        id,
        name: format!("Print #{id}"),
        price,
        image_url: None,
    }
}

fn cart_line(product_id: DbId, quantity: i64, claimed_price: f64) -> CartLine {
    CartLine {
        product_id,
        name: "whatever the client claims".to_string(),
        price: claimed_price,
        quantity,
        image_url: None,
    }
}

fn valid_request() -> CheckoutRequest {
    let address: BTreeMap<String, String> = [
        ("address_line1", "12 Abbey Road"),
        ("address_line2", ""),
        ("city", "Dublin"),
        ("state", "Leinster"),
        ("postal_code", "D02 X285"),
        ("country", "Ireland"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    CheckoutRequest {
        address,
        payment_method: "card".to_string(),
    }
}

#[tokio::test]
async fn total_ignores_client_supplied_prices() {
    let products = FakeProducts::with(vec![product(7, 50.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    // Client claims the product costs a cent.
    let cart = vec![cart_line(7, 2, 0.01)];
    let receipt = pipeline
        .checkout(1, &cart, &valid_request())
        .await
        .expect("checkout should succeed");

    assert_eq!(receipt.total_amount, 100.0);

    let committed = orders.committed();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].total_amount, 100.0);
    assert_eq!(committed[0].line_prices, vec![50.0]);
}

#[tokio::test]
async fn empty_cart_aborts_before_any_write() {
    let products = FakeProducts::with(vec![]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let result = pipeline.checkout(1, &[], &valid_request()).await;

    assert_matches!(result, Err(CheckoutError::EmptyCart));
    assert!(orders.committed().is_empty());
}

#[tokio::test]
async fn missing_product_aborts_whole_checkout() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    // Second line references a product the store does not know.
    let cart = vec![cart_line(1, 1, 10.0), cart_line(999, 1, 10.0)];
    let result = pipeline.checkout(1, &cart, &valid_request()).await;

    assert_matches!(result, Err(CheckoutError::Integrity { .. }));
    assert!(orders.committed().is_empty());
}

#[tokio::test]
async fn quantity_bounds_are_enforced() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    for quantity in [0, -1, 101] {
        let cart = vec![cart_line(1, quantity, 10.0)];
        let result = pipeline.checkout(1, &cart, &valid_request()).await;
        assert_matches!(
            result,
            Err(CheckoutError::Integrity { .. }),
            "quantity {quantity} must abort"
        );
    }
    assert!(orders.committed().is_empty());

    // 100 is the inclusive boundary.
    let cart = vec![cart_line(1, 100, 10.0)];
    let receipt = pipeline
        .checkout(1, &cart, &valid_request())
        .await
        .expect("quantity 100 should succeed");
    assert_eq!(receipt.total_amount, 1000.0);
}

#[tokio::test]
async fn total_ceiling_aborts() {
    let products = FakeProducts::with(vec![product(1, 20_000.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    // 20_000 * 100 = 2_000_000 > ceiling.
    let cart = vec![cart_line(1, 100, 20_000.0)];
    let result = pipeline.checkout(1, &cart, &valid_request()).await;

    assert_matches!(result, Err(CheckoutError::Integrity { .. }));
    assert!(orders.committed().is_empty());
}

#[tokio::test]
async fn invalid_payment_method_aborts() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let mut request = valid_request();
    request.payment_method = "iou".to_string();

    let cart = vec![cart_line(1, 1, 10.0)];
    let result = pipeline.checkout(1, &cart, &request).await;

    assert_matches!(result, Err(CheckoutError::InvalidPaymentMethod));
    assert!(orders.committed().is_empty());
}

#[tokio::test]
async fn address_validation_failure_surfaces_first_error() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let mut request = valid_request();
    request.address.insert("city".to_string(), "Dublin2".to_string());

    let cart = vec![cart_line(1, 1, 10.0)];
    let result = pipeline.checkout(1, &cart, &request).await;

    assert_matches!(result, Err(CheckoutError::InvalidAddress(message)) => {
        assert_eq!(message, "City must contain only letters");
    });
    assert!(orders.committed().is_empty());
}

#[tokio::test]
async fn empty_address_line2_passes_its_max_rule() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    // valid_request() leaves address_line2 empty; max:255 must not reject it.
    let cart = vec![cart_line(1, 1, 10.0)];
    let receipt = pipeline.checkout(1, &cart, &valid_request()).await;
    assert!(receipt.is_ok());
}

#[tokio::test]
async fn committed_draft_carries_sanitized_address() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = RecordingOrders::default();
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let mut request = valid_request();
    request.address.insert("city".to_string(), "  Dublin  ".to_string());

    let cart = vec![cart_line(1, 1, 10.0)];
    pipeline
        .checkout(42, &cart, &request)
        .await
        .expect("checkout should succeed");

    let committed = orders.committed();
    assert_eq!(committed[0].user_id, 42);
    assert_eq!(committed[0].city, "Dublin");
    assert_eq!(committed[0].payment_method, "card");
}

#[tokio::test]
async fn commit_failure_is_surfaced_as_commit_error() {
    let products = FakeProducts::with(vec![product(1, 10.0)]);
    let orders = FailingOrders;
    let pipeline = CheckoutPipeline::new(&products, &orders);

    let cart = vec![cart_line(1, 1, 10.0)];
    let result = pipeline.checkout(1, &cart, &valid_request()).await;

    assert_matches!(result, Err(CheckoutError::Commit(_)));
    // User-facing message stays generic.
    assert_eq!(
        result.unwrap_err().to_string(),
        "Order failed. Please try again."
    );
}
