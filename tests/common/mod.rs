#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use parish_hub::app::ports::{
    BibleTextPort, ChargeInitiation, ChargeRequest, EmailPort, Passage, PaymentGatewayPort,
    PushSenderPort,
};
use parish_hub::domain::{GivingStatus, Member};
use parish_hub::storage::{InMemoryStorage, Storage};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Gateway fake: records charge requests, answers verify with a canned status.
pub struct FakeGateway {
    pub charges: Mutex<Vec<ChargeRequest>>,
    pub verify_status: Mutex<GivingStatus>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            charges: Mutex::new(Vec::new()),
            verify_status: Mutex::new(GivingStatus::Pending),
        }
    }
}

#[async_trait]
impl PaymentGatewayPort for FakeGateway {
    async fn initiate_charge(&self, request: &ChargeRequest) -> Result<ChargeInitiation, String> {
        self.charges.lock().unwrap().push(request.clone());
        Ok(ChargeInitiation {
            gateway_ref: format!("GW-{}", request.reference),
            instructions: Some("approve the debit on your handset".to_string()),
        })
    }

    async fn verify_transaction(&self, _reference: &str) -> Result<GivingStatus, String> {
        Ok(*self.verify_status.lock().unwrap())
    }
}

pub struct FakeEmail {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl FakeEmail {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }
}

#[async_trait]
impl EmailPort for FakeEmail {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), String> {
        if self.fail {
            return Err("provider down".to_string());
        }
        self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub struct FakePush {
    pub sent: Mutex<Vec<String>>,
    pub fail_tokens: Vec<String>,
}

impl FakePush {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_tokens: Vec::new(),
        }
    }
}

#[async_trait]
impl PushSenderPort for FakePush {
    async fn send_to_token(&self, token: &str, _title: &str, _body: &str) -> Result<(), String> {
        if self.fail_tokens.iter().any(|t| t == token) {
            return Err("unregistered token".to_string());
        }
        self.sent.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

pub struct FakeBible;

#[async_trait]
impl BibleTextPort for FakeBible {
    async fn fetch_passage(&self, reference: &str) -> Result<Passage, String> {
        Ok(Passage {
            reference: reference.to_string(),
            text: "For God so loved the world...".to_string(),
            copyright: None,
        })
    }
}

pub fn storage() -> Arc<dyn Storage> {
    Arc::new(InMemoryStorage::new())
}

pub async fn seed_member(storage: &Arc<dyn Storage>, name: &str, email: Option<&str>) -> Uuid {
    let mut member = Member {
        id: None,
        full_name: name.to_string(),
        phone: Some("0244123456".to_string()),
        email: email.map(|e| e.to_string()),
        household: None,
        created_at: Utc::now(),
    };
    storage.create_member(&mut member).await.unwrap();
    member.id.unwrap()
}
