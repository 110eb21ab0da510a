//! X11 backend
//!
//! [X11Display] implements [DisplayConn] on top of an x11rb connection. It
//! performs the startup checks, becomes the window manager, grabs the key
//! bindings and turns raw protocol events into [XEvent]s.

use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::composite::{self, ConnectionExt as _, Redirect};
use x11rb::protocol::damage::{self, ConnectionExt as _, ReportLevel};
use x11rb::protocol::render::{
    self, ChangePictureAux, ConnectionExt as _, CreatePictureAux, PictType, Pictformat,
    Transform,
};
use x11rb::errors::ReplyError;
use x11rb::protocol::xfixes::{ConnectionExt as _, Region};
use x11rb::protocol::xinerama::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigWindow,
    ConfigureWindowAux, ConnectionExt as _, CreateWindowAux, EventMask, GrabMode, InputFocus,
    Keycode, ModMask, SubwindowMode, PropMode, Rectangle, Visualid, WindowClass,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{CURRENT_TIME, NONE};

use crate::shared::{Geometry, Xid};
use crate::wm::display::{
    Color, Damage, DisplayConn, PictOp, Picture, Prop, ScreenSurfaces, StackMode, WindowChanges,
    WmState,
};
use crate::wm::event::{KeyEvent, XError, XErrorKind, XEvent};
use crate::wm::ewmh::Atoms;
use crate::wm::hints::{SizeHints, WmHints};
use crate::wm::keyboard::{keysym, KeySym, ModifierState};
use crate::wm::WmError;

/// Number of progressively halved buffers kept per screen for thumbnails
const RESIZE_BUFFERS: u32 = 3;

/// Grab any key on the keyboard
const ANY_KEY: Keycode = 0;

/// Keycode to unshifted keysym table read at startup
struct Keymap {
    min_keycode: Keycode,
    per_keycode: usize,
    keysyms: Vec<KeySym>,
}

impl Keymap {
    fn read(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let reply = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;

        Ok(Self {
            min_keycode: min,
            per_keycode: reply.keysyms_per_keycode as usize,
            keysyms: reply.keysyms,
        })
    }

    fn keysym(&self, keycode: Keycode) -> Option<KeySym> {
        let idx = (keycode.checked_sub(self.min_keycode)? as usize) * self.per_keycode;
        self.keysyms.get(idx).copied().filter(|&s| s != 0)
    }

    /// Every keycode producing `sym` in any column
    fn keycodes(&self, sym: KeySym) -> Vec<Keycode> {
        self.keysyms
            .chunks(self.per_keycode.max(1))
            .enumerate()
            .filter(|(_, syms)| syms.contains(&sym))
            .map(|(i, _)| self.min_keycode + i as Keycode)
            .collect()
    }
}

pub struct X11Display {
    conn: Arc<RustConnection>,
    root: Xid,
    root_depth: u8,
    root_visual: Visualid,
    atoms: Atoms,
    /// Render format for each visual of the screen
    visual_formats: HashMap<Visualid, Pictformat>,
    argb32: Pictformat,
    keymap: Keymap,
    /// Scratch region damage is subtracted into
    repaired: Region,
    atom_ids: RefCell<HashMap<String, u32>>,
    atom_names: RefCell<HashMap<u32, String>>,
}

impl X11Display {
    /// Check the required extensions, take over the root window and grab the
    /// key bindings.
    pub fn new(conn: Arc<RustConnection>, screen_num: usize) -> Result<Self> {
        let screen = &conn.setup().roots[screen_num];
        let (root, root_depth, root_visual) = (screen.root, screen.root_depth, screen.root_visual);
        info!("Connected to X server, screen {}, root 0x{:x}", screen_num, root);

        check_extensions(&conn)?;

        let mask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY;
        conn.change_window_attributes(root, &ChangeWindowAttributesAux::new().event_mask(mask))?
            .check()
            .map_err(redirect_error)?;

        conn.composite_redirect_subwindows(root, Redirect::MANUAL)?;
        debug!("Redirected subwindows of root (Manual)");

        let (visual_formats, argb32) = read_pict_formats(&conn)?;
        let atoms = Atoms::new(conn.as_ref())?;
        let keymap = Keymap::read(&conn)?;

        let repaired = conn.generate_id()?;
        conn.xfixes_create_region(repaired, &[])?;

        let display = Self {
            conn,
            root,
            root_depth,
            root_visual,
            atoms,
            visual_formats,
            argb32,
            keymap,
            repaired,
            atom_ids: RefCell::default(),
            atom_names: RefCell::default(),
        };
        display.grab_keys()?;

        Ok(display)
    }

    fn grab_keys(&self) -> Result<()> {
        let grab = |modifiers: ModMask, keycode: Keycode| -> Result<()> {
            self.conn
                .grab_key(false, self.root, modifiers, keycode, GrabMode::ASYNC, GrabMode::ASYNC)?;
            Ok(())
        };

        // Everything pressed while super is held, and super itself for the overlay
        grab(ModMask::M4, ANY_KEY)?;
        for sym in [keysym::SUPER_L, keysym::SUPER_R] {
            for code in self.keymap.keycodes(sym) {
                grab(ModMask::ANY, code)?;
            }
        }

        for sym in keysym::F1..=keysym::F12 {
            for code in self.keymap.keycodes(sym) {
                grab(ModMask::CONTROL, code)?;
            }
        }
        for code in self.keymap.keycodes(keysym::F4) {
            grab(ModMask::M1, code)?;
        }

        info!("Key bindings grabbed");
        Ok(())
    }

    fn atom(&self, name: &str) -> Result<u32> {
        if let Some(&atom) = self.atom_ids.borrow().get(name) {
            return Ok(atom);
        }

        let atom = self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
        self.atom_ids.borrow_mut().insert(name.to_string(), atom);
        self.atom_names.borrow_mut().insert(atom, name.to_string());

        Ok(atom)
    }

    fn atom_name(&self, atom: u32) -> Result<String> {
        if let Some(name) = self.atom_names.borrow().get(&atom) {
            return Ok(name.clone());
        }

        let reply = self.conn.get_atom_name(atom)?.reply()?;
        let name = String::from_utf8_lossy(&reply.name).into_owned();
        self.atom_names.borrow_mut().insert(atom, name.clone());
        self.atom_ids.borrow_mut().insert(name.clone(), atom);

        Ok(name)
    }

    fn window_format(&self, id: Xid) -> Result<Pictformat> {
        let visual = self.conn.get_window_attributes(id)?.reply()?.visual;

        self.visual_formats
            .get(&visual)
            .copied()
            .ok_or_else(|| anyhow!("no render format for visual 0x{:x} of 0x{:x}", visual, id))
    }

    /// A picture backed by a fresh pixmap of the given depth and format
    fn create_pixmap_picture(
        &self,
        drawable: Xid,
        depth: u8,
        format: Pictformat,
        width: u32,
        height: u32,
    ) -> Result<Picture> {
        let pixmap = self.conn.generate_id()?;
        self.conn
            .create_pixmap(depth, pixmap, drawable, clamp_u16(width), clamp_u16(height))?;
        let picture = self.conn.generate_id()?;
        self.conn
            .render_create_picture(picture, pixmap, format, &CreatePictureAux::new())?;
        self.conn.free_pixmap(pixmap)?;

        Ok(picture)
    }

    fn convert_event(&self, event: Event) -> Result<Option<XEvent>> {
        let converted = match event {
            Event::CreateNotify(e) => XEvent::Create {
                id: e.window,
                geometry: Geometry::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
                override_redirect: e.override_redirect,
            },
            Event::DestroyNotify(e) => XEvent::Destroy(e.window),
            Event::MapRequest(e) => XEvent::MapRequest(e.window),
            Event::MapNotify(e) => XEvent::MapNotify(e.window),
            Event::UnmapNotify(e) => XEvent::UnmapNotify(e.window),
            Event::ConfigureNotify(e) => XEvent::ConfigureNotify {
                id: e.window,
                geometry: Geometry::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
            },
            Event::ConfigureRequest(e) => {
                let has = |flag: ConfigWindow| e.value_mask.contains(flag);
                let changes = WindowChanges {
                    x: has(ConfigWindow::X).then_some(e.x as i32),
                    y: has(ConfigWindow::Y).then_some(e.y as i32),
                    width: has(ConfigWindow::WIDTH).then_some(e.width as u32),
                    height: has(ConfigWindow::HEIGHT).then_some(e.height as u32),
                    border_width: has(ConfigWindow::BORDER_WIDTH).then_some(e.border_width as u32),
                    sibling: has(ConfigWindow::SIBLING).then_some(e.sibling),
                    stack_mode: has(ConfigWindow::STACK_MODE)
                        .then(|| from_x_stack_mode(e.stack_mode))
                        .flatten(),
                };
                XEvent::ConfigureRequest {
                    id: e.window,
                    changes,
                }
            }
            Event::DamageNotify(e) => XEvent::Damage {
                drawable: e.drawable,
                damage: e.damage,
                area: from_rectangle(e.area),
            },
            Event::KeyPress(e) => match self.keymap.keysym(e.detail) {
                Some(keysym) => XEvent::KeyPress(KeyEvent {
                    keysym,
                    state: modifiers(u16::from(e.state)),
                }),
                None => return Ok(None),
            },
            Event::KeyRelease(e) => match self.keymap.keysym(e.detail) {
                Some(keysym) => XEvent::KeyRelease(KeyEvent {
                    keysym,
                    state: modifiers(u16::from(e.state)),
                }),
                None => return Ok(None),
            },
            Event::PropertyNotify(e) => XEvent::Property {
                id: e.window,
                atom: self.atom_name(e.atom)?,
            },
            Event::Error(e) => XEvent::Error(XError {
                kind: match e.error_kind {
                    ErrorKind::Access => XErrorKind::Access,
                    ErrorKind::Window => XErrorKind::Window,
                    _ => XErrorKind::Other(e.error_code),
                },
                major_opcode: e.major_opcode,
                bad_value: e.bad_value,
            }),
            other => {
                trace!("Ignoring event: {:?}", other);
                return Ok(None);
            }
        };

        Ok(Some(converted))
    }
}

impl DisplayConn for X11Display {
    fn root(&self) -> Xid {
        self.root
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(converted) = self.convert_event(event)? {
                return Ok(Some(converted));
            }
        }

        Ok(None)
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    fn screen_geometries(&self) -> Result<Vec<Geometry>> {
        let xinerama = self
            .conn
            .extension_information(xinerama::X11_EXTENSION_NAME)?
            .is_some()
            && self.conn.xinerama_is_active()?.reply()?.state != 0;

        if xinerama {
            let screens = self.conn.xinerama_query_screens()?.reply()?.screen_info;
            debug!("Xinerama reports {} screen(s)", screens.len());
            return Ok(screens
                .iter()
                .map(|s| {
                    Geometry::new(s.x_org.into(), s.y_org.into(), s.width.into(), s.height.into())
                })
                .collect());
        }

        let g = self.conn.get_geometry(self.root)?.reply()?;
        Ok(vec![Geometry::new(0, 0, g.width as u32, g.height as u32)])
    }

    fn create_screen_surfaces(&self, geometry: Geometry) -> Result<ScreenSurfaces> {
        let window = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .event_mask(EventMask::EXPOSURE);
        self.conn.create_window(
            self.root_depth,
            window,
            self.root,
            geometry.x as i16,
            geometry.y as i16,
            clamp_u16(geometry.width),
            clamp_u16(geometry.height),
            0,
            WindowClass::INPUT_OUTPUT,
            self.root_visual,
            &aux,
        )?;
        self.conn.composite_unredirect_window(window, Redirect::MANUAL)?;
        self.conn.map_window(window)?;

        let format = self
            .visual_formats
            .get(&self.root_visual)
            .copied()
            .ok_or(WmError::NoVisualFormat(window))?;

        let picture = self.conn.generate_id()?;
        let aux = CreatePictureAux::new().subwindowmode(SubwindowMode::INCLUDE_INFERIORS);
        self.conn
            .render_create_picture(picture, window, format, &aux)
            .context("Failed to create picture for screen window")?;

        let (width, height) = (geometry.width, geometry.height);
        let buffer = self.create_pixmap_picture(window, self.root_depth, format, width, height)?;

        let mut resize_buffers = Vec::new();
        for i in 1..=RESIZE_BUFFERS {
            let buf = self.create_pixmap_picture(
                window,
                32,
                self.argb32,
                (geometry.width >> i).max(1),
                (geometry.height >> i).max(1),
            )?;
            self.conn.render_set_picture_filter(buf, b"bilinear", &[])?;
            resize_buffers.push(buf);
        }

        debug!(
            "Screen {:?} has window 0x{:x}, buffer 0x{:x}",
            geometry, window, buffer
        );

        Ok(ScreenSurfaces {
            window,
            picture,
            buffer,
            resize_buffers,
        })
    }

    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>> {
        let atom = self.atom(name)?;
        let reply = self
            .conn
            .get_property(false, id, atom, AtomEnum::ANY, 0, 1024)?
            .reply()?;

        if reply.type_ == NONE {
            return Ok(None);
        }

        let values = || -> Vec<u32> {
            reply
                .value32()
                .map(|iter| iter.collect())
                .unwrap_or_default()
        };
        let strings = || -> Vec<String> {
            reply
                .value
                .split(|&b| b == 0)
                .filter(|s| !s.is_empty())
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        };

        let prop = match reply.type_ {
            t if t == u32::from(AtomEnum::ATOM) => Prop::Atom(
                values()
                    .into_iter()
                    .map(|a| self.atom_name(a))
                    .collect::<Result<_>>()?,
            ),
            t if t == u32::from(AtomEnum::WINDOW) => Prop::Window(values()),
            t if t == u32::from(AtomEnum::CARDINAL) => Prop::Cardinal(values()),
            t if t == u32::from(AtomEnum::STRING) || t == self.atoms.utf8_string => {
                Prop::UTF8String(strings())
            }
            t if t == u32::from(AtomEnum::WM_HINTS) => match WmHints::from_raw(&values()) {
                Some(hints) => Prop::WmHints(hints),
                None => return Ok(None),
            },
            t if t == u32::from(AtomEnum::WM_SIZE_HINTS) => match SizeHints::from_raw(&values()) {
                Some(hints) => Prop::WmNormalHints(hints),
                None => return Ok(None),
            },
            t => {
                trace!("Unhandled type {} for property {} on 0x{:x}", t, name, id);
                return Ok(None);
            }
        };

        Ok(Some(prop))
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        let wm_state = self.atoms.wm_state;
        self.conn
            .change_property32(PropMode::REPLACE, id, wm_state, wm_state, &[state as u32, NONE])?;
        Ok(())
    }

    fn watch_properties(&self, id: Xid) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE);
        self.conn.change_window_attributes(id, &aux)?;
        Ok(())
    }

    fn configure_window(&self, id: Xid, changes: &WindowChanges) -> Result<()> {
        let mut aux = ConfigureWindowAux::new();
        aux.x = changes.x;
        aux.y = changes.y;
        aux.width = changes.width;
        aux.height = changes.height;
        aux.border_width = changes.border_width;
        aux.sibling = changes.sibling;
        aux.stack_mode = changes.stack_mode.map(to_x_stack_mode);

        self.conn.configure_window(id, &aux)?;
        Ok(())
    }

    fn set_window_x(&self, id: Xid, x: i32) -> Result<()> {
        self.conn.configure_window(id, &ConfigureWindowAux::new().x(x))?;
        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.conn.map_window(id)?;
        Ok(())
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, id, CURRENT_TIME)?;
        Ok(())
    }

    fn send_delete_window(&self, id: Xid) -> Result<()> {
        let event = ClientMessageEvent::new(
            32,
            id,
            self.atoms.wm_protocols,
            [self.atoms.wm_delete_window, CURRENT_TIME, 0, 0, 0],
        );
        self.conn.send_event(false, id, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    fn unredirect_window(&self, id: Xid) -> Result<()> {
        self.conn.composite_unredirect_window(id, Redirect::MANUAL)?;
        Ok(())
    }

    fn create_window_picture(&self, id: Xid) -> Result<Picture> {
        let format = self.window_format(id)?;
        let picture = self.conn.generate_id()?;
        let aux = CreatePictureAux::new().subwindowmode(SubwindowMode::INCLUDE_INFERIORS);
        self.conn.render_create_picture(picture, id, format, &aux)?;

        Ok(picture)
    }

    fn free_picture(&self, picture: Picture) -> Result<()> {
        self.conn.render_free_picture(picture)?;
        Ok(())
    }

    fn create_damage(&self, id: Xid) -> Result<Damage> {
        let damage = self.conn.generate_id()?;
        self.conn.damage_create(damage, id, ReportLevel::NON_EMPTY)?;
        Ok(damage)
    }

    fn destroy_damage(&self, damage: Damage) -> Result<()> {
        self.conn.damage_destroy(damage)?;
        Ok(())
    }

    fn subtract_damage(&self, damage: Damage) -> Result<Vec<Geometry>> {
        self.conn.damage_subtract(damage, NONE, self.repaired)?;
        let region = self.conn.xfixes_fetch_region(self.repaired)?.reply()?;

        Ok(region.rectangles.into_iter().map(from_rectangle).collect())
    }

    fn fill_rectangle(&self, op: PictOp, dst: Picture, color: Color, r: Geometry) -> Result<()> {
        let color = render::Color {
            red: color.red,
            green: color.green,
            blue: color.blue,
            alpha: color.alpha,
        };
        self.conn
            .render_fill_rectangles(to_render_op(op), dst, color, &[to_rectangle(r)])?;
        Ok(())
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
        self.conn.render_composite(
            to_render_op(op),
            src,
            NONE,
            dst,
            0,
            0,
            0,
            0,
            x as i16,
            y as i16,
            clamp_u16(width),
            clamp_u16(height),
        )?;
        Ok(())
    }

    fn set_clip_rectangles(&self, dst: Picture, rects: Option<&[Geometry]>) -> Result<()> {
        match rects {
            Some(rects) => {
                let rects: Vec<Rectangle> = rects.iter().copied().map(to_rectangle).collect();
                self.conn.render_set_picture_clip_rectangles(dst, 0, 0, &rects)?;
            }
            None => {
                self.conn
                    .render_change_picture(dst, &ChangePictureAux::new().clipmask(NONE))?;
            }
        }

        Ok(())
    }

    fn set_picture_scale(&self, picture: Picture, scale: f64) -> Result<()> {
        let one = to_fixed(1.0);
        let transform = Transform {
            matrix11: one,
            matrix12: 0,
            matrix13: 0,
            matrix21: 0,
            matrix22: one,
            matrix23: 0,
            matrix31: 0,
            matrix32: 0,
            matrix33: to_fixed(scale),
        };
        self.conn.render_set_picture_transform(picture, transform)?;
        Ok(())
    }
}

fn check_extensions(conn: &RustConnection) -> Result<()> {
    for name in [
        composite::X11_EXTENSION_NAME,
        damage::X11_EXTENSION_NAME,
        render::X11_EXTENSION_NAME,
    ] {
        if conn.extension_information(name)?.is_none() {
            return Err(WmError::MissingExtension(name).into());
        }
    }

    let version = conn.composite_query_version(0, 4)?.reply()?;
    let (major, minor) = (version.major_version, version.minor_version);
    if !(major > 0 || minor >= 2) {
        return Err(WmError::ExtensionTooOld {
            name: composite::X11_EXTENSION_NAME,
            major,
            minor,
            required: "0.2",
        }
        .into());
    }
    info!("Composite extension {}.{}", major, minor);

    // Damage regions are XFixes regions; the version handshake has to happen first
    conn.xfixes_query_version(5, 0)?.reply()?;
    let damage = conn.damage_query_version(1, 1)?.reply()?;
    let render = conn.render_query_version(0, 11)?.reply()?;
    debug!(
        "Damage {}.{}, Render {}.{}",
        damage.major_version, damage.minor_version, render.major_version, render.minor_version
    );

    Ok(())
}

/// Render formats for every visual on the display, plus the standard ARGB32 format
fn read_pict_formats(conn: &RustConnection) -> Result<(HashMap<Visualid, Pictformat>, Pictformat)> {
    let reply = conn.render_query_pict_formats()?.reply()?;

    let visual_formats = reply
        .screens
        .iter()
        .flat_map(|s| &s.depths)
        .flat_map(|d| &d.visuals)
        .map(|v| (v.visual, v.format))
        .collect();

    let argb32 = reply
        .formats
        .iter()
        .find(|f| {
            f.type_ == PictType::DIRECT
                && f.depth == 32
                && f.direct.alpha_mask == 0xff
                && f.direct.alpha_shift == 24
                && f.direct.red_shift == 16
                && f.direct.green_shift == 8
                && f.direct.blue_shift == 0
        })
        .map(|f| f.id);

    match argb32 {
        Some(id) => Ok((visual_formats, id)),
        None => {
            warn!("No ARGB32 render format on this display");
            Err(WmError::MissingExtension("Render ARGB32 format").into())
        }
    }
}

fn modifiers(state: u16) -> ModifierState {
    let mut m = ModifierState::empty();
    m.set(ModifierState::SHIFT, state & u16::from(ModMask::SHIFT) != 0);
    m.set(ModifierState::CONTROL, state & u16::from(ModMask::CONTROL) != 0);
    m.set(ModifierState::ALT, state & u16::from(ModMask::M1) != 0);
    m.set(ModifierState::SUPER, state & u16::from(ModMask::M4) != 0);

    m
}

fn to_render_op(op: PictOp) -> render::PictOp {
    match op {
        PictOp::Src => render::PictOp::SRC,
        PictOp::Over => render::PictOp::OVER,
    }
}

fn to_x_stack_mode(mode: StackMode) -> xproto::StackMode {
    match mode {
        StackMode::Above => xproto::StackMode::ABOVE,
        StackMode::Below => xproto::StackMode::BELOW,
        StackMode::TopIf => xproto::StackMode::TOP_IF,
        StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
        StackMode::Opposite => xproto::StackMode::OPPOSITE,
    }
}

fn from_x_stack_mode(mode: xproto::StackMode) -> Option<StackMode> {
    let m = match mode {
        xproto::StackMode::ABOVE => StackMode::Above,
        xproto::StackMode::BELOW => StackMode::Below,
        xproto::StackMode::TOP_IF => StackMode::TopIf,
        xproto::StackMode::BOTTOM_IF => StackMode::BottomIf,
        xproto::StackMode::OPPOSITE => StackMode::Opposite,
        _ => return None,
    };

    Some(m)
}

/// Only BadAccess means the root is already taken; anything else is passed on
fn redirect_error(err: ReplyError) -> anyhow::Error {
    match err {
        ReplyError::X11Error(e) if e.error_kind == ErrorKind::Access => {
            WmError::AnotherWmRunning.into()
        }
        err => anyhow::Error::new(err).context("Failed to select root window events"),
    }
}

fn from_rectangle(r: Rectangle) -> Geometry {
    Geometry::new(r.x as i32, r.y as i32, r.width as u32, r.height as u32)
}

fn to_rectangle(g: Geometry) -> Rectangle {
    Rectangle {
        x: g.x as i16,
        y: g.y as i16,
        width: clamp_u16(g.width),
        height: clamp_u16(g.height),
    }
}

fn clamp_u16(v: u32) -> u16 {
    v.min(u16::MAX as u32) as u16
}

/// 16.16 fixed point, as used by Render transforms
fn to_fixed(v: f64) -> render::Fixed {
    (v * 65536.0).round() as render::Fixed
}
