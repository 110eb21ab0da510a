//! A recording [DisplayConn] for tests.
//!
//! Properties and events are scripted up front; every command the core
//! issues is appended to a call log that tests then assert against.

use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::shared::{Geometry, Xid};
use crate::wm::display::{
    Color, Damage, DisplayConn, PictOp, Picture, Prop, ScreenSurfaces, WindowChanges, WmState,
};
use crate::wm::event::XEvent;

pub const ROOT: Xid = 999;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetWmState(Xid, WmState),
    WatchProperties(Xid),
    Configure(Xid, WindowChanges),
    SetWindowX(Xid, i32),
    Map(Xid),
    Focus(Xid),
    DeleteWindow(Xid),
    Unredirect(Xid),
    CreatePicture(Xid),
    FreePicture(Picture),
    CreateDamage(Xid),
    DestroyDamage(Damage),
    SubtractDamage(Damage),
    FillRectangle(PictOp, Picture, Color, Geometry),
    Composite {
        op: PictOp,
        src: Picture,
        dst: Picture,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    SetClip(Picture, Option<Vec<Geometry>>),
    SetScale(Picture, f64),
}

#[derive(Debug)]
pub struct MockDisplay {
    screens: Vec<Geometry>,
    props: RefCell<HashMap<(Xid, String), Prop>>,
    failing: RefCell<HashSet<Xid>>,
    refusing: RefCell<HashSet<Xid>>,
    repairs: RefCell<HashMap<Damage, Vec<Geometry>>>,
    events: RefCell<VecDeque<XEvent>>,
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::with_screens(vec![Geometry::new(0, 0, 1920, 1080)])
    }
}

impl MockDisplay {
    pub fn with_screens(screens: Vec<Geometry>) -> Self {
        Self {
            screens,
            props: RefCell::default(),
            failing: RefCell::default(),
            refusing: RefCell::default(),
            repairs: RefCell::default(),
            events: RefCell::default(),
            calls: RefCell::default(),
            next_id: Cell::new(0x1000),
        }
    }

    pub fn set_prop(&self, id: Xid, name: &str, prop: Prop) {
        self.props.borrow_mut().insert((id, name.to_string()), prop);
    }

    /// Make every property query for `id` fail, as if the window vanished
    pub fn fail_props(&self, id: Xid) {
        self.failing.borrow_mut().insert(id);
    }

    /// Make window commands targeting `id` fail, as if the connection broke
    pub fn refuse_requests(&self, id: Xid) {
        self.refusing.borrow_mut().insert(id);
    }

    /// Region returned by the next subtract of `damage`
    pub fn set_repair(&self, damage: Damage, rects: Vec<Geometry>) {
        self.repairs.borrow_mut().insert(damage, rects);
    }

    pub fn push_event(&self, event: XEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn record_for(&self, id: Xid, call: Call) -> Result<()> {
        if self.refusing.borrow().contains(&id) {
            return Err(anyhow!("request for 0x{:x} refused", id));
        }

        self.record(call)
    }

    fn fresh_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl DisplayConn for MockDisplay {
    fn root(&self) -> Xid {
        ROOT
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        Ok(self.events.borrow_mut().pop_front())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn screen_geometries(&self) -> Result<Vec<Geometry>> {
        Ok(self.screens.clone())
    }

    fn create_screen_surfaces(&self, _geometry: Geometry) -> Result<ScreenSurfaces> {
        Ok(ScreenSurfaces {
            window: self.fresh_id(),
            picture: self.fresh_id(),
            buffer: self.fresh_id(),
            resize_buffers: (0..3).map(|_| self.fresh_id()).collect(),
        })
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        if self.failing.borrow().contains(&id) {
            return Err(anyhow!("BadWindow: 0x{:x}", id));
        }

        Ok(self.props.borrow().get(&(id, name.to_string())).cloned())
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.record(Call::SetWmState(id, state))
    }

    fn watch_properties(&self, id: Xid) -> Result<()> {
        self.record(Call::WatchProperties(id))
    }

    fn configure_window(&self, id: Xid, changes: &WindowChanges) -> Result<()> {
        self.record_for(id, Call::Configure(id, *changes))
    }

    fn set_window_x(&self, id: Xid, x: i32) -> Result<()> {
        self.record_for(id, Call::SetWindowX(id, x))
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.record_for(id, Call::Map(id))
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.record_for(id, Call::Focus(id))
    }

    fn send_delete_window(&self, id: Xid) -> Result<()> {
        self.record(Call::DeleteWindow(id))
    }

    fn unredirect_window(&self, id: Xid) -> Result<()> {
        self.record(Call::Unredirect(id))
    }

    fn create_window_picture(&self, id: Xid) -> Result<Picture> {
        self.record(Call::CreatePicture(id))?;
        Ok(self.fresh_id())
    }

    fn free_picture(&self, picture: Picture) -> Result<()> {
        self.record(Call::FreePicture(picture))
    }

    fn create_damage(&self, id: Xid) -> Result<Damage> {
        self.record(Call::CreateDamage(id))?;
        Ok(self.fresh_id())
    }

    fn destroy_damage(&self, damage: Damage) -> Result<()> {
        self.record(Call::DestroyDamage(damage))
    }

    fn subtract_damage(&self, damage: Damage) -> Result<Vec<Geometry>> {
        self.record(Call::SubtractDamage(damage))?;
        Ok(self.repairs.borrow_mut().remove(&damage).unwrap_or_default())
    }

    fn fill_rectangle(&self, op: PictOp, dst: Picture, color: Color, r: Geometry) -> Result<()> {
        self.record(Call::FillRectangle(op, dst, color, r))
    }

    fn composite(
        &self,
        op: PictOp,
        src: Picture,
        dst: Picture,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        self.record(Call::Composite {
            op,
            src,
            dst,
            x,
            y,
            width,
            height,
        })
    }

    fn set_clip_rectangles(&self, dst: Picture, rects: Option<&[Geometry]>) -> Result<()> {
        self.record(Call::SetClip(dst, rects.map(|r| r.to_vec())))
    }

    fn set_picture_scale(&self, picture: Picture, scale: f64) -> Result<()> {
        self.record(Call::SetScale(picture, scale))
    }
}
