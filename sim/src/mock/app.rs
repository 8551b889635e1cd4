// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Mock Filecoin app state machine
//!
//! Handles APDUs and button events, tracking the current screen.
//! Interactive requests (address display, signing) switch to a review
//! flow and respond once the user approves or rejects.

use log::{debug, info, warn};
use tokio::sync::oneshot;

use ledger_fil_apdu::{
    app_info::{DeviceInfo, VersionInfo},
    ChunkType, Confirm, DerivationPath, Instruction, StatusCode, DEVICE_APDU_CLA, FIL_APDU_CLA,
    INS_DEVICE_INFO,
};

use super::{
    display::{paginate, Screen},
    keys::Wallet,
    tx::Message,
    MockError,
};
use crate::{Button, Model};

/// Raw APDU response (data and status word)
pub type Answer = (Vec<u8>, u16);

/// Response to an incoming APDU
pub enum Response {
    /// Immediate response
    Ready(Answer),
    /// Response deferred until user interaction completes
    Deferred(oneshot::Receiver<Answer>),
}

/// Main menu entries
#[derive(Copy, Clone, Debug, PartialEq)]
enum MenuItem {
    Ready,
    Expert,
    Version,
}

const MENU: [MenuItem; 3] = [MenuItem::Ready, MenuItem::Expert, MenuItem::Version];

/// Review screen kinds
#[derive(Clone, Debug, PartialEq)]
enum Page {
    Info(Screen),
    Approve,
    Reject,
}

/// In-progress review
struct Review {
    pages: Vec<Page>,
    index: usize,
    response: Vec<u8>,
    reject_message: &'static str,
    reply: oneshot::Sender<Answer>,
}

enum State {
    Menu(usize),
    Review(Review),
}

/// Mock Filecoin application
pub struct App {
    model: Model,
    wallet: Wallet,
    version: VersionInfo,
    expert: bool,
    state: State,
    sign_buffer: Option<(DerivationPath, Vec<u8>)>,
}

impl App {
    /// Create a new app instance with the provided wallet
    pub fn new(model: Model, wallet: Wallet) -> Self {
        Self {
            model,
            wallet,
            version: VersionInfo {
                test_mode: false,
                major: 0,
                minor: 22,
                patch: 3,
                device_locked: Some(false),
                target_id: Some(target_id(model)),
            },
            expert: false,
            state: State::Menu(0),
            sign_buffer: None,
        }
    }

    /// Check whether expert mode is enabled
    pub fn expert(&self) -> bool {
        self.expert
    }

    /// Fetch the current screen
    pub fn screen(&self) -> Screen {
        match &self.state {
            State::Menu(i) => match MENU[*i] {
                MenuItem::Ready => Screen::new("Filecoin", "is ready"),
                MenuItem::Expert => Screen::new(
                    "Expert mode",
                    match self.expert {
                        true => "enabled",
                        false => "disabled",
                    },
                ),
                MenuItem::Version => Screen::new(
                    "Version",
                    format!(
                        "{}.{}.{}",
                        self.version.major, self.version.minor, self.version.patch
                    ),
                ),
            },
            State::Review(r) => match &r.pages[r.index] {
                Page::Info(s) => s.clone(),
                Page::Approve => Screen::new("APPROVE", ""),
                Page::Reject => Screen::new("REJECT", ""),
            },
        }
    }

    /// Render the current screen
    pub fn render(&self) -> image::RgbaImage {
        let (w, h) = self.model.screen_size();
        self.screen().render(w, h)
    }

    /// Handle a button press
    pub fn button(&mut self, button: Button) {
        debug!("Button: {button}");

        let state = std::mem::replace(&mut self.state, State::Menu(0));

        self.state = match state {
            State::Menu(i) => match (button, MENU[i]) {
                (Button::Left, _) => State::Menu(i.saturating_sub(1)),
                (Button::Right, _) => State::Menu((i + 1).min(MENU.len() - 1)),
                (Button::Both, MenuItem::Expert) => {
                    self.expert = !self.expert;
                    info!("Expert mode: {}", self.expert);
                    State::Menu(i)
                }
                (Button::Both, _) => State::Menu(i),
            },
            State::Review(mut r) => {
                let page = r.pages[r.index].clone();

                match (button, page) {
                    (Button::Left, _) => {
                        r.index = r.index.saturating_sub(1);
                        State::Review(r)
                    }
                    (Button::Right, _) => {
                        r.index = (r.index + 1).min(r.pages.len() - 1);
                        State::Review(r)
                    }
                    (Button::Both, Page::Approve) => {
                        info!("Request approved");
                        let _ = r.reply.send((r.response, StatusCode::OK.0));
                        State::Menu(0)
                    }
                    (Button::Both, Page::Reject) => {
                        info!("Request rejected");
                        let _ = r.reply.send((
                            r.reject_message.as_bytes().to_vec(),
                            StatusCode::COMMAND_NOT_ALLOWED.0,
                        ));
                        State::Menu(0)
                    }
                    (Button::Both, Page::Info(_)) => State::Review(r),
                }
            }
        };
    }

    /// Handle an incoming APDU
    pub fn apdu(&mut self, cla: u8, ins: u8, p1: u8, data: &[u8]) -> Response {
        debug!("APDU cla: 0x{cla:02x} ins: 0x{ins:02x} p1: 0x{p1:02x} ({} bytes)", data.len());

        // Abandoned reviews are cancelled by the next request
        if let State::Review(r) = &self.state {
            if r.reply.is_closed() {
                warn!("Cancelling abandoned review");
                self.state = State::Menu(0);
            }
        }

        if matches!(self.state, State::Review(_)) {
            return Response::Ready(error(MockError::Busy));
        }

        let r = match (cla, ins) {
            (DEVICE_APDU_CLA, INS_DEVICE_INFO) => Ok(self.device_info()),
            (FIL_APDU_CLA, _) => match Instruction::try_from(ins) {
                Ok(Instruction::GetVersion) => Ok(Response::Ready(ok(self.version.encode()))),
                Ok(Instruction::GetAddrSecp256k1) => self.address(p1, data),
                Ok(Instruction::SignSecp256k1) => self.sign(p1, data),
                Err(_) => Err(MockError::InsNotSupported),
            },
            _ => Err(MockError::ClaNotSupported),
        };

        match r {
            Ok(r) => r,
            Err(e) => {
                debug!("Request failed: {e}");
                Response::Ready(error(e))
            }
        }
    }

    fn device_info(&self) -> Response {
        let i = DeviceInfo {
            target_id: target_id(self.model),
            se_version: "2.1.0".to_string(),
            flags: vec![0xa6, 0x00, 0x00, 0x00],
            mcu_version: "4.03".to_string(),
        };

        Response::Ready(ok(i.encode()))
    }

    fn address(&mut self, p1: u8, data: &[u8]) -> Result<Response, MockError> {
        let path = parse_path(data)?;
        let a = self.wallet.address(&path)?;

        match Confirm::try_from(p1) {
            Ok(Confirm::Silent) => Ok(Response::Ready(ok(a.encode()))),
            Ok(Confirm::Display) => {
                let mut pages: Vec<_> = paginate("Address", &a.address)
                    .into_iter()
                    .map(Page::Info)
                    .collect();
                pages.push(Page::Approve);
                pages.push(Page::Reject);

                Ok(self.review(pages, a.encode(), ""))
            }
            Err(_) => Err(MockError::InvalidP1P2),
        }
    }

    fn sign(&mut self, p1: u8, data: &[u8]) -> Result<Response, MockError> {
        let chunk = ChunkType::try_from(p1).map_err(|_| MockError::InvalidP1P2)?;

        match chunk {
            ChunkType::Init => {
                let path = parse_path(data)?;
                self.sign_buffer = Some((path, vec![]));
                return Ok(Response::Ready(ok(vec![])));
            }
            ChunkType::Add => {
                let (_, b) = self.sign_buffer.as_mut().ok_or(MockError::NotInitialised)?;
                b.extend_from_slice(data);
                return Ok(Response::Ready(ok(vec![])));
            }
            ChunkType::Last => (),
        }

        let (path, mut message) = self.sign_buffer.take().ok_or(MockError::NotInitialised)?;
        message.extend_from_slice(data);

        // Validate before display
        let m = Message::decode(&message)?;
        let signature = self.wallet.sign(&path, &message)?;

        let mut pages = vec![Page::Info(Screen::new("Review", "transaction"))];
        if self.expert {
            pages.push(Page::Info(Screen::new("Expert mode", "enabled")));
        }
        for (title, value) in m.review_items(self.expert) {
            pages.extend(paginate(title, &value).into_iter().map(Page::Info));
        }
        pages.push(Page::Approve);
        pages.push(Page::Reject);

        Ok(self.review(pages, signature.encode(), "Transaction rejected"))
    }

    fn review(
        &mut self,
        pages: Vec<Page>,
        response: Vec<u8>,
        reject_message: &'static str,
    ) -> Response {
        debug!("Starting review ({} pages)", pages.len());

        let (tx, rx) = oneshot::channel();

        self.state = State::Review(Review {
            pages,
            index: 0,
            response,
            reject_message,
            reply: tx,
        });

        Response::Deferred(rx)
    }
}

fn ok(data: Vec<u8>) -> Answer {
    (data, StatusCode::OK.0)
}

fn error(e: MockError) -> Answer {
    (e.detail().as_bytes().to_vec(), e.status().0)
}

fn parse_path(data: &[u8]) -> Result<DerivationPath, MockError> {
    if data.len() != ledger_fil_apdu::path::PATH_ENCODED_LEN {
        return Err(MockError::WrongLength);
    }

    DerivationPath::from_bytes(data).map_err(|_| MockError::WrongLength)
}

fn target_id(model: Model) -> [u8; 4] {
    match model {
        Model::NanoS => [0x31, 0x10, 0x00, 0x04],
        Model::NanoSP => [0x33, 0x10, 0x00, 0x04],
        Model::NanoX => [0x33, 0x00, 0x00, 0x04],
    }
}
