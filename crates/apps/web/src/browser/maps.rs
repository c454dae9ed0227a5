use wasm_bindgen::prelude::*;

// Thin glue over the Google Maps JS API. Event wiring stays on the JS side;
// the callbacks passed to `atlas_maps_create` report back into Rust.
#[wasm_bindgen(inline_js = "
function __atlas_lat_lng(lat, lng) {
    return { lat: lat, lng: lng };
}

export function atlas_maps_ready() {
    return typeof google === 'object' && !!google.maps && typeof google.maps.Map === 'function';
}

export function atlas_maps_create(container, optionsJson, onMove, onOut, onMarker) {
    const opts = JSON.parse(optionsJson);
    const map = new google.maps.Map(container, opts);
    map.__atlasListeners = [
        google.maps.event.addListener(map, 'mousemove', (e) => {
            onMove(e.latLng.lat(), e.latLng.lng(), map.getZoom());
        }),
        google.maps.event.addListener(map, 'mouseout', () => onOut()),
    ];
    map.__atlasMarkerClick = onMarker;
    return map;
}

export function atlas_maps_release(map) {
    (map.__atlasListeners || []).forEach((l) => google.maps.event.removeListener(l));
    map.__atlasListeners = [];
    map.__atlasMarkerClick = null;
    google.maps.event.clearInstanceListeners(map);
}

export function atlas_maps_set_center(map, lat, lng) {
    map.setCenter(__atlas_lat_lng(lat, lng));
}

export function atlas_maps_fit_bounds(map, south, west, north, east) {
    map.fitBounds(new google.maps.LatLngBounds(
        __atlas_lat_lng(south, west),
        __atlas_lat_lng(north, east),
    ));
}

export function atlas_maps_add_marker(map, id, lat, lng, title, hint, icon) {
    const marker = new google.maps.Marker({
        map: map,
        position: __atlas_lat_lng(lat, lng),
        icon: icon ? {
            url: icon,
            size: new google.maps.Size(16, 16),
            anchor: new google.maps.Point(8, 8),
        } : undefined,
    });

    const body = document.createElement('div');
    body.appendChild(document.createTextNode(title));
    body.appendChild(document.createElement('br'));
    body.appendChild(document.createTextNode(hint));
    const info = new google.maps.InfoWindow({ content: body });
    marker.__atlasInfo = info;

    marker.addListener('mouseover', () => info.open(map, marker));
    marker.addListener('mouseout', () => info.close());
    marker.addListener('click', () => map.__atlasMarkerClick && map.__atlasMarkerClick(id, 0));
    marker.addListener('rightclick', () => map.__atlasMarkerClick && map.__atlasMarkerClick(id, 2));
    return marker;
}

export function atlas_maps_circle(map, lat, lng, radius) {
    return new google.maps.Circle({
        map: map,
        center: __atlas_lat_lng(lat, lng),
        radius: radius,
        strokeColor: '#006DFC',
        strokeOpacity: 0.4,
        strokeWeight: 1,
        fillColor: '#006DFC',
        fillOpacity: 0.15,
        clickable: false,
    });
}

export function atlas_maps_polyline(map, pathJson) {
    return new google.maps.Polyline({
        map: map,
        path: JSON.parse(pathJson),
        geodesic: true,
        strokeColor: '#FF0000',
        strokeOpacity: 1.0,
        strokeWeight: 2,
    });
}

export function atlas_maps_remove(overlay) {
    if (overlay.__atlasInfo) {
        overlay.__atlasInfo.close();
    }
    google.maps.event.clearInstanceListeners(overlay);
    overlay.setMap(null);
}
")]
extern "C" {
    pub fn atlas_maps_ready() -> bool;

    #[wasm_bindgen(catch)]
    pub fn atlas_maps_create(
        container: &web_sys::Element,
        options_json: &str,
        on_move: &Closure<dyn FnMut(f64, f64, f64)>,
        on_out: &Closure<dyn FnMut()>,
        on_marker: &Closure<dyn FnMut(f64, u32)>,
    ) -> Result<JsValue, JsValue>;

    pub fn atlas_maps_release(map: &JsValue);

    pub fn atlas_maps_set_center(map: &JsValue, lat: f64, lng: f64);

    pub fn atlas_maps_fit_bounds(map: &JsValue, south: f64, west: f64, north: f64, east: f64);

    pub fn atlas_maps_add_marker(
        map: &JsValue,
        id: f64,
        lat: f64,
        lng: f64,
        title: &str,
        hint: &str,
        icon: &str,
    ) -> JsValue;

    pub fn atlas_maps_circle(map: &JsValue, lat: f64, lng: f64, radius: f64) -> JsValue;

    pub fn atlas_maps_polyline(map: &JsValue, path_json: &str) -> JsValue;

    pub fn atlas_maps_remove(overlay: &JsValue);
}
